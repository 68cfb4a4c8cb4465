//! imscc2md - Common Cartridge to Markdown converter

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use imscc2md::{BookConfig, DEFAULT_MANIFEST, Manifest, ResourcePolicy};

#[derive(Parser)]
#[command(name = "imscc2md")]
#[command(version, about = "Convert a Common Cartridge course package to Markdown", long_about = None)]
#[command(after_help = "EXAMPLES:
    imscc2md course.imscc                   Write output_book.md
    imscc2md course.imscc -o course.md      Choose the output file
    imscc2md -i course.imscc                Show the course outline
    imscc2md -i --json course.imscc         Dump the manifest as JSON")]
struct Cli {
    /// Input package (.imscc)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output Markdown file
    #[arg(short, long, default_value = "output_book.md")]
    output: PathBuf,

    /// Directory the package is extracted into
    #[arg(short = 'x', long, default_value = "extracted_content")]
    extract_dir: PathBuf,

    /// Manifest file name inside the package
    #[arg(long, default_value = DEFAULT_MANIFEST)]
    manifest: String,

    /// Skip broken quiz, link and discussion files instead of failing
    #[arg(long)]
    lenient: bool,

    /// Leave discussion topics out of the book
    #[arg(long)]
    no_discussions: bool,

    /// Show the course outline without converting
    #[arg(short, long)]
    info: bool,

    /// With --info, print the manifest as JSON
    #[arg(long, requires = "info")]
    json: bool,

    /// Only report errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log every item and resource
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = if cli.info {
        show_info(&cli)
    } else {
        convert(&cli)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn book_config(cli: &Cli) -> BookConfig {
    let policy = if cli.lenient {
        ResourcePolicy::Lenient
    } else {
        ResourcePolicy::Strict
    };

    BookConfig::new()
        .with_policy(policy)
        .with_discussions(!cli.no_discussions)
        .with_manifest_name(cli.manifest.as_str())
}

fn convert(cli: &Cli) -> Result<(), String> {
    imscc2md::convert_package(&cli.input, &cli.extract_dir, &cli.output, &book_config(cli))
        .map_err(|e| e.to_string())
}

fn show_info(cli: &Cli) -> Result<(), String> {
    imscc2md::extract_package(&cli.input, &cli.extract_dir).map_err(|e| e.to_string())?;
    let manifest = imscc2md::parse_manifest(cli.extract_dir.join(&cli.manifest))
        .map_err(|e| e.to_string())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&manifest).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(());
    }

    println!("File: {}", cli.input.display());
    println!("Items: {}", manifest.item_count());
    println!("Depth: {}", manifest.max_depth());
    println!("Resources: {}", manifest.resources.len());
    print_outline(&manifest);

    Ok(())
}

fn print_outline(manifest: &Manifest) {
    fn walk(item: &imscc2md::HierarchyItem, depth: usize, manifest: &Manifest) {
        let indent = "  ".repeat(depth);
        match item
            .resource
            .as_deref()
            .and_then(|id| manifest.resources.get(id))
        {
            Some(href) => println!("{indent}{} ({href})", item.title),
            None => println!("{indent}{}", item.title),
        }
        for child in &item.children {
            walk(child, depth + 1, manifest);
        }
    }

    println!();
    for item in &manifest.hierarchy {
        walk(item, 0, manifest);
    }
}
