//! Unpacking of `.imscc` archives.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use tracing::info;
use zip::ZipArchive;

use crate::error::Result;

/// Extract a package from disk into `extract_to`, creating the directory if needed.
///
/// Entries whose names would escape `extract_to` are rejected by the zip reader.
pub fn extract_package<P: AsRef<Path>, Q: AsRef<Path>>(path: P, extract_to: Q) -> Result<()> {
    let file = File::open(path.as_ref())?;
    extract_package_from_reader(file, extract_to)
}

/// Extract a package from any [`Read`] + [`Seek`] source.
pub fn extract_package_from_reader<R: Read + Seek, Q: AsRef<Path>>(
    reader: R,
    extract_to: Q,
) -> Result<()> {
    let mut archive = ZipArchive::new(reader)?;
    let target = extract_to.as_ref();

    std::fs::create_dir_all(target)?;
    archive.extract(target)?;

    info!(
        entries = archive.len(),
        target = %target.display(),
        "extracted package"
    );
    Ok(())
}
