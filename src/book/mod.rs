//! Book assembly.
//!
//! Walks the organization tree depth-first, emitting one heading per item
//! followed by the text of the item's resource, if any.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::manifest::{HierarchyItem, ResourceMap};
use crate::resource::{self, ResourceKind};

/// Conventional manifest file name at the package root.
pub const DEFAULT_MANIFEST: &str = "imsmanifest.xml";

/// What to do when a matched resource is structurally broken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResourcePolicy {
    /// Abort the conversion with the reader's error.
    #[default]
    Strict,
    /// Log a warning and emit nothing for that resource.
    Lenient,
}

/// Configuration for book assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookConfig {
    /// Character repeated once per nesting level to form a heading.
    pub heading_marker: char,
    pub policy: ResourcePolicy,
    /// Read discussion topics; when false they contribute only a heading.
    pub include_discussions: bool,
    /// Manifest file name, relative to the extraction directory.
    pub manifest_name: String,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            heading_marker: '#',
            policy: ResourcePolicy::Strict,
            include_discussions: true,
            manifest_name: DEFAULT_MANIFEST.to_string(),
        }
    }
}

impl BookConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heading_marker(mut self, marker: char) -> Self {
        self.heading_marker = marker;
        self
    }

    pub fn with_policy(mut self, policy: ResourcePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_discussions(mut self, include: bool) -> Self {
        self.include_discussions = include;
        self
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }
}

/// Render `hierarchy` into a single document, reading resources under `root`.
pub fn build_book(
    hierarchy: &[HierarchyItem],
    resources: &ResourceMap,
    root: &Path,
    config: &BookConfig,
) -> Result<String> {
    BookBuilder::new(resources, root, config).build(hierarchy)
}

/// Accumulates headings and resource fragments in traversal order.
pub struct BookBuilder<'a> {
    resources: &'a ResourceMap,
    root: &'a Path,
    config: &'a BookConfig,
    output: String,
}

impl<'a> BookBuilder<'a> {
    pub fn new(resources: &'a ResourceMap, root: &'a Path, config: &'a BookConfig) -> Self {
        Self {
            resources,
            root,
            config,
            output: String::new(),
        }
    }

    /// Consume the builder and return the finished document.
    pub fn build(mut self, hierarchy: &[HierarchyItem]) -> Result<String> {
        for item in hierarchy {
            self.visit(item, 1)?;
        }
        Ok(self.output)
    }

    fn visit(&mut self, item: &HierarchyItem, depth: usize) -> Result<()> {
        self.push_heading(&item.title, depth);

        if let Some(fragment) = self.item_fragment(item)? {
            self.output.push_str(&fragment);
            self.output.push_str("\n\n");
        }

        for child in &item.children {
            self.visit(child, depth + 1)?;
        }
        Ok(())
    }

    fn push_heading(&mut self, title: &str, depth: usize) {
        self.output
            .extend(std::iter::repeat_n(self.config.heading_marker, depth));
        self.output.push(' ');
        self.output.push_str(title);
        self.output.push_str("\n\n");
    }

    /// Text for the item's resource; `None` when there is nothing to read.
    fn item_fragment(&self, item: &HierarchyItem) -> Result<Option<String>> {
        let Some(resource_id) = item.resource.as_deref() else {
            return Ok(None);
        };
        let Some(entry) = self.resources.entry(resource_id) else {
            debug!(item = %item.identifier, resource = resource_id, "resource not in manifest");
            return Ok(None);
        };
        let Some(path) = self.locate(&entry.href) else {
            debug!(item = %item.identifier, href = %entry.href, "resource file missing");
            return Ok(None);
        };

        let kind = resource::classify(&entry.href, entry.resource_type.as_deref());
        debug!(item = %item.identifier, href = %entry.href, kind = kind.as_str(), "dispatching resource");

        match kind {
            ResourceKind::Unknown => return Ok(None),
            ResourceKind::Discussion if !self.config.include_discussions => return Ok(None),
            _ => {}
        }

        match resource::read_resource(kind, &path) {
            Ok(fragment) => Ok(fragment),
            Err(e) if self.config.policy == ResourcePolicy::Lenient => {
                warn!(href = %entry.href, kind = kind.as_str(), error = %e, "skipping unreadable resource");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve an href under the root, trying its percent-decoded form second.
    fn locate(&self, href: &str) -> Option<PathBuf> {
        let direct = self.root.join(href);
        if direct.is_file() {
            return Some(direct);
        }

        let decoded = percent_encoding::percent_decode_str(href).decode_utf8().ok()?;
        if decoded == href {
            return None;
        }
        let decoded = self.root.join(decoded.as_ref());
        decoded.is_file().then_some(decoded)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::Error;

    const WEBLINK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<webLink xmlns="http://www.imsglobal.org/xsd/imsccv1p3/imswl_v1p3">
  <title>Syllabus</title>
  <url href="https://example.com/syllabus"/>
</webLink>"#;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_module_with_page() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "page1.html", "<p>Hello</p>");

        let mut resources = ResourceMap::new();
        resources.insert_href("r1", "page1.html");
        let hierarchy = vec![
            HierarchyItem::new("Module 1", "m1")
                .with_child(HierarchyItem::new("Page 1", "p1").with_resource("r1")),
        ];

        let book = build_book(&hierarchy, &resources, dir.path(), &BookConfig::default()).unwrap();
        assert_eq!(book, "# Module 1\n\n## Page 1\n\nHello\n\n");
    }

    #[test]
    fn test_unresolved_resources_emit_heading_only() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "files/slides.pdf", "%PDF-1.4");

        let mut resources = ResourceMap::new();
        resources.insert_href("gone", "missing.html");
        resources.insert_href("pdf", "files/slides.pdf");
        let hierarchy = vec![
            HierarchyItem::new("Unmapped", "a").with_resource("nope"),
            HierarchyItem::new("Missing", "b").with_resource("gone"),
            HierarchyItem::new("Slides", "c").with_resource("pdf"),
        ];

        let book = build_book(&hierarchy, &resources, dir.path(), &BookConfig::default()).unwrap();
        assert_eq!(book, "# Unmapped\n\n# Missing\n\n# Slides\n\n");
    }

    #[test]
    fn test_weblink_fragment_is_separated() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "weblinks/link.xml", WEBLINK);

        let mut resources = ResourceMap::new();
        resources.insert_href("w", "weblinks/link.xml");
        let hierarchy = vec![HierarchyItem::new("Links", "l").with_resource("w")];

        let book = build_book(&hierarchy, &resources, dir.path(), &BookConfig::default()).unwrap();
        assert_eq!(
            book,
            "# Links\n\nTitle: Syllabus\nURL: https://example.com/syllabus\n\n\n\n"
        );
    }

    #[test]
    fn test_percent_encoded_href() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "wiki_content/Week 1.html", "<p>Intro</p>");

        let mut resources = ResourceMap::new();
        resources.insert_href("r", "wiki_content/Week%201.html");
        let hierarchy = vec![HierarchyItem::new("Week 1", "w").with_resource("r")];

        let book = build_book(&hierarchy, &resources, dir.path(), &BookConfig::default()).unwrap();
        assert_eq!(book, "# Week 1\n\nIntro\n\n");
    }

    #[test]
    fn test_strict_and_lenient_policy() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "weblinks/broken.xml",
            r#"<webLink xmlns="http://www.imsglobal.org/xsd/imsccv1p3/imswl_v1p3"><url href="x"/></webLink>"#,
        );

        let mut resources = ResourceMap::new();
        resources.insert_href("w", "weblinks/broken.xml");
        let hierarchy = vec![HierarchyItem::new("Broken", "b").with_resource("w")];

        let strict = build_book(&hierarchy, &resources, dir.path(), &BookConfig::default());
        assert!(matches!(strict, Err(Error::MissingElement(_))));

        let lenient = BookConfig::new().with_policy(ResourcePolicy::Lenient);
        let book = build_book(&hierarchy, &resources, dir.path(), &lenient).unwrap();
        assert_eq!(book, "# Broken\n\n");
    }

    #[test]
    fn test_discussions_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "g1/topic.xml",
            r#"<topic xmlns="http://www.imsglobal.org/xsd/imsccv1p3/imsdt_v1p3"><title>Forum</title></topic>"#,
        );

        let mut resources = ResourceMap::new();
        resources.insert(
            "d",
            crate::manifest::ResourceEntry {
                href: "g1/topic.xml".to_string(),
                resource_type: Some("imsdt_xmlv1p3".to_string()),
            },
        );
        let hierarchy = vec![HierarchyItem::new("Discuss", "d1").with_resource("d")];

        let book = build_book(&hierarchy, &resources, dir.path(), &BookConfig::default()).unwrap();
        assert_eq!(book, "# Discuss\n\nTitle: Forum\n\n\n\n");

        let config = BookConfig::new().with_discussions(false);
        let book = build_book(&hierarchy, &resources, dir.path(), &config).unwrap();
        assert_eq!(book, "# Discuss\n\n");
    }

    #[test]
    fn test_custom_heading_marker() {
        let hierarchy = vec![
            HierarchyItem::new("A", "a").with_child(
                HierarchyItem::new("B", "b").with_child(HierarchyItem::new("C", "c")),
            ),
        ];
        let config = BookConfig::new().with_heading_marker('=');
        let book = build_book(&hierarchy, &ResourceMap::new(), Path::new("."), &config).unwrap();
        assert_eq!(book, "= A\n\n== B\n\n=== C\n\n");
    }
}
