//! Discussion topics (`imsdt` documents).

use std::path::Path;

use super::weblink::pick_namespace;
use crate::error::Result;
use crate::html::html_to_plain_text;
use crate::xml::Element;

/// Discussion-topic namespaces, newest first.
pub const DT_NAMESPACES: &[&str] = &[
    "http://www.imsglobal.org/xsd/imsccv1p3/imsdt_v1p3",
    "http://www.imsglobal.org/xsd/imsccv1p2/imsdt_v1p2",
    "http://www.imsglobal.org/xsd/imsccv1p1/imsdt_v1p1",
];

/// Read a discussion-topic file.
pub fn read_discussion(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    parse_discussion(&bytes)
}

/// Format a topic as a `Title:` line followed by the prompt as plain text.
pub fn parse_discussion(bytes: &[u8]) -> Result<String> {
    let root = Element::parse_bytes(bytes)?;
    let ns = pick_namespace(&root, DT_NAMESPACES);

    let title = root.require_child(ns, "title")?.text();
    let body = root
        .child(ns, "text")
        .map(|text| html_to_plain_text(text.text()))
        .unwrap_or_default();

    if body.is_empty() {
        Ok(format!("Title: {title}\n\n"))
    } else {
        Ok(format!("Title: {title}\n\n{body}\n\n"))
    }
}
