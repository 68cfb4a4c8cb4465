//! Course structure read from `imsmanifest.xml`.
//!
//! A manifest carries two things the converter needs: the organization tree
//! (the course's table of contents) and the resource registry that maps
//! resource identifiers to files inside the package.

mod parser;

use std::collections::HashMap;

use serde::Serialize;

pub use parser::{CP_NAMESPACE, CP_NAMESPACES, parse_manifest, parse_manifest_str};

/// Heading text used when an item has no usable `<title>`.
pub const NO_TITLE: &str = "No Title";

/// One node of the organization tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyItem {
    pub title: String,
    pub identifier: String,
    /// Referenced resource identifier (`identifierref`); `None` for folder nodes.
    pub resource: Option<String>,
    pub children: Vec<HierarchyItem>,
}

impl HierarchyItem {
    pub fn new(title: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            identifier: identifier.into(),
            resource: None,
            children: Vec::new(),
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    pub fn with_child(mut self, child: HierarchyItem) -> Self {
        self.children.push(child);
        self
    }

    /// Number of items in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(HierarchyItem::count).sum::<usize>()
    }

    /// Depth of this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(HierarchyItem::depth)
            .max()
            .unwrap_or(0)
    }
}

/// A `<resource>` that declares a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceEntry {
    pub href: String,
    /// Declared `type` attribute, e.g. `webcontent` or `imsdt_xmlv1p3`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

/// Resource identifier to package-relative file path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResourceMap {
    entries: HashMap<String, ResourceEntry>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>, entry: ResourceEntry) {
        self.entries.insert(identifier.into(), entry);
    }

    /// Register a plain file path with no declared type.
    pub fn insert_href(&mut self, identifier: impl Into<String>, href: impl Into<String>) {
        self.insert(
            identifier,
            ResourceEntry {
                href: href.into(),
                resource_type: None,
            },
        );
    }

    /// File path for a resource identifier.
    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(|e| e.href.as_str())
    }

    pub fn entry(&self, identifier: &str) -> Option<&ResourceEntry> {
        self.entries.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed manifest: organization tree plus resource registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub hierarchy: Vec<HierarchyItem>,
    pub resources: ResourceMap,
}

impl Manifest {
    /// Total number of organization items.
    pub fn item_count(&self) -> usize {
        self.hierarchy.iter().map(HierarchyItem::count).sum()
    }

    /// Deepest nesting level of the organization tree (0 when empty).
    pub fn max_depth(&self) -> usize {
        self.hierarchy
            .iter()
            .map(HierarchyItem::depth)
            .max()
            .unwrap_or(0)
    }
}
