//! `imsmanifest.xml` parsing.

use std::path::Path;

use tracing::debug;

use super::{HierarchyItem, Manifest, NO_TITLE, ResourceEntry, ResourceMap};
use crate::error::{Error, Result};
use crate::xml::Element;

/// Namespace of the content-packaging elements in a Common Cartridge 1.3 manifest.
pub const CP_NAMESPACE: &str = "http://www.imsglobal.org/xsd/imsccv1p3/imscp_v1p1";

/// Content-packaging namespaces accepted on the root element, newest first.
pub const CP_NAMESPACES: &[&str] = &[
    CP_NAMESPACE,
    "http://www.imsglobal.org/xsd/imsccv1p2/imscp_v1p1",
    "http://www.imsglobal.org/xsd/imsccv1p1/imscp_v1p1",
    "http://www.imsglobal.org/xsd/imscp_v1p1",
];

/// Read and parse a manifest file.
pub fn parse_manifest<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let bytes = std::fs::read(path.as_ref())?;
    let root = Element::parse_bytes(&bytes)?;
    parse_root(&root)
}

/// Parse manifest XML already held in memory.
pub fn parse_manifest_str(content: &str) -> Result<Manifest> {
    let root = Element::parse(content)?;
    parse_root(&root)
}

fn parse_root(root: &Element) -> Result<Manifest> {
    let ns = root
        .namespace()
        .and_then(|ns| CP_NAMESPACES.iter().copied().find(|known| *known == ns))
        .unwrap_or(CP_NAMESPACE);

    let organization = root
        .descend(ns, &["organizations", "organization"])
        .ok_or_else(|| Error::missing_element("organizations/organization"))?;

    let hierarchy = organization
        .children_named(ns, "item")
        .map(|item| parse_item(ns, item))
        .collect::<Result<Vec<_>>>()?;

    let resources = parse_resources(ns, root);

    debug!(
        top_level_items = hierarchy.len(),
        resources = resources.len(),
        "parsed manifest"
    );

    Ok(Manifest {
        hierarchy,
        resources,
    })
}

fn parse_item(ns: &str, item: &Element) -> Result<HierarchyItem> {
    let title = item
        .child(ns, "title")
        .map(Element::text)
        .filter(|text| !text.trim().is_empty())
        .unwrap_or(NO_TITLE);

    let identifier = item.require_attr("identifier")?;

    let children = item
        .children_named(ns, "item")
        .map(|child| parse_item(ns, child))
        .collect::<Result<Vec<_>>>()?;

    Ok(HierarchyItem {
        title: title.to_string(),
        identifier: identifier.to_string(),
        resource: item.attr("identifierref").map(str::to_string),
        children,
    })
}

fn parse_resources(ns: &str, root: &Element) -> ResourceMap {
    let mut map = ResourceMap::new();

    let Some(resources) = root.child(ns, "resources") else {
        return map;
    };

    for resource in resources.children_named(ns, "resource") {
        let Some(identifier) = resource.attr("identifier") else {
            continue;
        };
        // Metadata-only resources have no <file>
        let Some(href) = resource
            .child(ns, "file")
            .and_then(|file| file.attr("href"))
        else {
            continue;
        };

        map.insert(
            identifier,
            ResourceEntry {
                href: href.to_string(),
                resource_type: resource.attr("type").map(str::to_string),
            },
        );
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest identifier="m" xmlns="{CP_NAMESPACE}"
    xmlns:lomm="http://ltsc.ieee.org/xsd/imsccv1p3/LOM/manifest">
{body}
</manifest>"#
        )
    }

    #[test]
    fn test_parse_nested_items() {
        let xml = manifest(
            r#"<organizations>
  <organization identifier="org_1" structure="rooted-hierarchy">
    <item identifier="mod1">
      <title>Module 1</title>
      <item identifier="p1" identifierref="res1">
        <title>Page 1</title>
      </item>
      <item identifier="p2" identifierref="res2">
        <title>Page 2</title>
      </item>
    </item>
    <item identifier="mod2">
      <title>Module 2</title>
    </item>
  </organization>
</organizations>
<resources>
  <resource identifier="res1" type="webcontent" href="wiki_content/page-1.html">
    <file href="wiki_content/page-1.html"/>
  </resource>
</resources>"#,
        );

        let result = parse_manifest_str(&xml).unwrap();

        assert_eq!(result.hierarchy.len(), 2);
        let module = &result.hierarchy[0];
        assert_eq!(module.title, "Module 1");
        assert_eq!(module.identifier, "mod1");
        assert_eq!(module.resource, None);
        assert_eq!(module.children.len(), 2);
        assert_eq!(module.children[0].title, "Page 1");
        assert_eq!(module.children[0].resource.as_deref(), Some("res1"));
        assert_eq!(module.children[1].identifier, "p2");
        assert!(result.hierarchy[1].children.is_empty());

        assert_eq!(result.resources.get("res1"), Some("wiki_content/page-1.html"));
        assert_eq!(
            result.resources.entry("res1").unwrap().resource_type.as_deref(),
            Some("webcontent")
        );
    }

    #[test]
    fn test_missing_or_empty_title_defaults() {
        let xml = manifest(
            r#"<organizations><organization identifier="o">
  <item identifier="a"/>
  <item identifier="b"><title></title></item>
  <item identifier="c"><title>  </title></item>
</organization></organizations>"#,
        );

        let result = parse_manifest_str(&xml).unwrap();
        let titles: Vec<_> = result.hierarchy.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec![NO_TITLE, NO_TITLE, NO_TITLE]);
    }

    #[test]
    fn test_title_entities_are_decoded() {
        let xml = manifest(
            r#"<organizations><organization identifier="o">
  <item identifier="a"><title>Q&amp;A &lt;Week 1&gt;</title></item>
</organization></organizations>"#,
        );

        let result = parse_manifest_str(&xml).unwrap();
        assert_eq!(result.hierarchy[0].title, "Q&A <Week 1>");
    }

    #[test]
    fn test_item_without_identifier_is_fatal() {
        let xml = manifest(
            r#"<organizations><organization identifier="o">
  <item identifier="ok"><item><title>Broken</title></item></item>
</organization></organizations>"#,
        );

        let err = parse_manifest_str(&xml).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingAttribute { ref attribute, .. } if attribute == "identifier"
        ));
    }

    #[test]
    fn test_duplicate_identifier_attribute_is_fatal() {
        let xml = manifest(
            r#"<organizations><organization identifier="o">
  <item identifier="a" identifier="b"><title>Twice</title></item>
</organization></organizations>"#,
        );

        assert!(matches!(parse_manifest_str(&xml), Err(Error::Xml(_))));
    }

    #[test]
    fn test_missing_organization_is_fatal() {
        let xml = manifest("<organizations/><resources/>");
        assert!(matches!(
            parse_manifest_str(&xml),
            Err(Error::MissingElement(_))
        ));
    }

    #[test]
    fn test_elements_outside_namespace_are_ignored() {
        // Same local names, but no namespace: not a CC manifest organization.
        let xml = r#"<manifest><organizations><organization identifier="o">
<item identifier="a"><title>T</title></item>
</organization></organizations></manifest>"#;
        assert!(parse_manifest_str(xml).is_err());
    }

    #[test]
    fn test_resources_without_file_are_omitted() {
        let xml = manifest(
            r#"<organizations><organization identifier="o"/></organizations>
<resources>
  <resource identifier="meta" type="associatedcontent/imscc_xmlv1p3/learning-application-resource"/>
  <resource identifier="link" type="imswl_xmlv1p3">
    <file href="weblinks/link.xml"/>
  </resource>
  <resource type="webcontent"><file href="orphan.html"/></resource>
</resources>"#,
        );

        let result = parse_manifest_str(&xml).unwrap();
        assert!(result.hierarchy.is_empty());
        assert_eq!(result.resources.len(), 1);
        assert!(!result.resources.contains("meta"));
        assert_eq!(result.resources.get("link"), Some("weblinks/link.xml"));
    }

    #[test]
    fn test_older_cartridge_namespace() {
        let xml = r#"<manifest identifier="m" xmlns="http://www.imsglobal.org/xsd/imsccv1p1/imscp_v1p1">
<organizations><organization identifier="o">
  <item identifier="a" identifierref="r"><title>Intro</title></item>
</organization></organizations>
<resources><resource identifier="r" type="webcontent"><file href="intro.html"/></resource></resources>
</manifest>"#;

        let result = parse_manifest_str(xml).unwrap();
        assert_eq!(result.hierarchy[0].title, "Intro");
        assert_eq!(result.resources.get("r"), Some("intro.html"));
    }

    #[test]
    fn test_malformed_xml_is_fatal() {
        assert!(parse_manifest_str("<manifest><organizations>").is_err());
        assert!(matches!(
            parse_manifest_str("<a></b>"),
            Err(Error::Xml(_))
        ));
    }
}
