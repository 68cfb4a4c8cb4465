//! Course pages (`.html`).

use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::html::extract_text;
use crate::util::{decode_text, html_charset, xml_encoding};

/// Read a page and return its text with all tags stripped.
///
/// Returns `Ok(None)` when the bytes are malformed in the page's declared
/// charset.
pub fn read_page(path: &Path) -> Result<Option<String>> {
    let bytes = std::fs::read(path)?;
    let text = decode_page(&bytes);
    if text.is_none() {
        warn!(path = %path.display(), "page does not decode in its declared charset, skipping");
    }
    Ok(text)
}

/// Decode page bytes and extract their text.
///
/// The encoding comes from a BOM, then UTF-8, then the `<meta>` charset or
/// XML declaration, then Windows-1252.
pub fn decode_page(bytes: &[u8]) -> Option<String> {
    let charset = html_charset(bytes).or_else(|| xml_encoding(bytes));
    let content = decode_text(bytes, charset)?;
    Some(extract_text(&content))
}
