//! Web links (`imswl` documents).

use std::path::Path;

use crate::error::Result;
use crate::xml::Element;

/// Web-link namespaces, newest first. The first is used when the document
/// declares none of them.
pub const WL_NAMESPACES: &[&str] = &[
    "http://www.imsglobal.org/xsd/imsccv1p3/imswl_v1p3",
    "http://www.imsglobal.org/xsd/imsccv1p2/imswl_v1p2",
    "http://www.imsglobal.org/xsd/imsccv1p1/imswl_v1p1",
];

/// Read a web-link file.
pub fn read_weblink(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    parse_weblink(&bytes)
}

/// Format a web-link document as `Title: ...` and `URL: ...` lines.
pub fn parse_weblink(bytes: &[u8]) -> Result<String> {
    let root = Element::parse_bytes(bytes)?;
    let ns = pick_namespace(&root, WL_NAMESPACES);

    let title = root.require_child(ns, "title")?.text();
    let url = root.require_child(ns, "url")?.require_attr("href")?;

    Ok(format!("Title: {title}\nURL: {url}\n\n"))
}

/// The document's namespace if it is one of `known`, else the first of `known`.
pub(crate) fn pick_namespace(root: &Element, known: &[&'static str]) -> &'static str {
    root.namespace()
        .and_then(|ns| known.iter().copied().find(|k| *k == ns))
        .unwrap_or(known[0])
}
