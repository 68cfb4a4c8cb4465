//! # imscc2md
//!
//! Convert IMS Common Cartridge (`.imscc`) course packages into a single
//! markdown document.
//!
//! The package's organization tree becomes a heading hierarchy: each item is
//! a heading whose level is its nesting depth, followed by the text of the
//! resource it references. HTML pages, web links, quizzes and discussion
//! topics are read; other resources contribute only their heading.
//!
//! ## Quick Start
//!
//! ```no_run
//! use imscc2md::{BookConfig, convert_package};
//!
//! convert_package("course.imscc", "extracted_content", "output_book.md", &BookConfig::default())
//!     .unwrap();
//! ```
//!
//! ## Working with the Pieces
//!
//! ```no_run
//! use std::path::Path;
//!
//! use imscc2md::{BookConfig, build_book, extract_package, parse_manifest};
//!
//! extract_package("course.imscc", "extracted").unwrap();
//! let manifest = parse_manifest("extracted/imsmanifest.xml").unwrap();
//! println!("{} items", manifest.item_count());
//!
//! let text = build_book(
//!     &manifest.hierarchy,
//!     &manifest.resources,
//!     Path::new("extracted"),
//!     &BookConfig::default(),
//! )
//! .unwrap();
//! ```

pub mod archive;
pub mod book;
pub mod error;
pub mod html;
pub mod manifest;
pub mod resource;
pub mod xml;

pub(crate) mod util;

use std::path::Path;

use tracing::info;

pub use archive::{extract_package, extract_package_from_reader};
pub use book::{BookBuilder, BookConfig, DEFAULT_MANIFEST, ResourcePolicy, build_book};
pub use error::{Error, Result};
pub use manifest::{HierarchyItem, Manifest, ResourceEntry, ResourceMap, parse_manifest};
pub use resource::{ResourceKind, classify};

/// Extract `input` into `extract_dir`, render it, and write the document to `output`.
///
/// Nothing is written when any step fails.
pub fn convert_package<P, Q, R>(input: P, extract_dir: Q, output: R, config: &BookConfig) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
{
    let extract_dir = extract_dir.as_ref();
    extract_package(input, extract_dir)?;

    let text = render_package(extract_dir, config)?;
    std::fs::write(output.as_ref(), &text)?;

    info!(
        output = %output.as_ref().display(),
        bytes = text.len(),
        "wrote book"
    );
    Ok(())
}

/// Render an already extracted package.
pub fn render_package<P: AsRef<Path>>(extract_dir: P, config: &BookConfig) -> Result<String> {
    let root = extract_dir.as_ref();
    let manifest = parse_manifest(root.join(&config.manifest_name))?;

    info!(
        items = manifest.item_count(),
        resources = manifest.resources.len(),
        "parsed manifest"
    );
    build_book(&manifest.hierarchy, &manifest.resources, root, config)
}
