//! Per-resource text extraction.
//!
//! A resource file is classified once into a [`ResourceKind`] and then handed
//! to the matching reader. Every reader turns one file into one text fragment.

mod discussion;
mod page;
mod quiz;
mod weblink;

use std::path::Path;

use crate::error::Result;

pub use discussion::{DT_NAMESPACES, parse_discussion, read_discussion};
pub use page::{decode_page, read_page};
pub use quiz::{QTI_NAMESPACE, Question, parse_quiz, read_quiz};
pub use weblink::{WL_NAMESPACES, parse_weblink, read_weblink};

/// What kind of content a resource file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    WebLink,
    Quiz,
    Discussion,
    HtmlPage,
    /// Media, PDFs and anything else without a reader.
    Unknown,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::WebLink => "web link",
            ResourceKind::Quiz => "quiz",
            ResourceKind::Discussion => "discussion",
            ResourceKind::HtmlPage => "html page",
            ResourceKind::Unknown => "unknown",
        }
    }
}

/// Classify a package-relative resource path.
///
/// Checks run in a fixed order: `weblinks` in the path, then `quiz` in the
/// path, then a declared `imsdt*` type, then an `.html` extension.
pub fn classify(href: &str, declared_type: Option<&str>) -> ResourceKind {
    if href.contains("weblinks") {
        ResourceKind::WebLink
    } else if href.contains("quiz") {
        ResourceKind::Quiz
    } else if declared_type.is_some_and(|t| t.starts_with("imsdt")) {
        ResourceKind::Discussion
    } else if href.to_ascii_lowercase().ends_with(".html") {
        ResourceKind::HtmlPage
    } else {
        ResourceKind::Unknown
    }
}

/// Run the reader for `kind` on the file at `path`.
///
/// `Ok(None)` means the resource contributes nothing: an unknown kind or a
/// page that is not valid text.
pub fn read_resource(kind: ResourceKind, path: &Path) -> Result<Option<String>> {
    match kind {
        ResourceKind::WebLink => read_weblink(path).map(Some),
        ResourceKind::Quiz => read_quiz(path).map(Some),
        ResourceKind::Discussion => read_discussion(path).map(Some),
        ResourceKind::HtmlPage => read_page(path),
        ResourceKind::Unknown => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_order() {
        assert_eq!(classify("weblinks/link.xml", None), ResourceKind::WebLink);
        assert_eq!(
            classify("non_cc_assessments/quiz_1.xml.qti", None),
            ResourceKind::Quiz
        );
        // Web-link check wins over quiz check
        assert_eq!(classify("weblinks/quiz.xml", None), ResourceKind::WebLink);
        assert_eq!(
            classify("g123/topic.xml", Some("imsdt_xmlv1p3")),
            ResourceKind::Discussion
        );
        assert_eq!(classify("wiki_content/Page.HTML", None), ResourceKind::HtmlPage);
        assert_eq!(
            classify("wiki_content/page.html", Some("webcontent")),
            ResourceKind::HtmlPage
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify("web_resources/syllabus.pdf", None), ResourceKind::Unknown);
        assert_eq!(classify("media/video.mp4", Some("webcontent")), ResourceKind::Unknown);
        assert_eq!(classify("page.htm", None), ResourceKind::Unknown);
    }

    #[test]
    fn test_unknown_kind_reads_nothing() {
        let result = read_resource(ResourceKind::Unknown, Path::new("/does/not/matter")).unwrap();
        assert!(result.is_none());
    }
}
