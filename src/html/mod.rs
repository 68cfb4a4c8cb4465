//! HTML to text.
//!
//! Pages are parsed with html5ever into a small arena DOM ([`ArenaDom`]) and
//! flattened in one of two ways:
//!
//! - [`extract_text`]: every text node in document order, tags dropped. Used
//!   for course pages.
//! - [`html_to_plain_text`]: a readable plain-text rendering with paragraph
//!   breaks, list markers and emphasis, links reduced to their text and images
//!   dropped. Used for quiz prompts, answer choices and discussion bodies.

mod arena;
mod sink;
mod text;

use html5ever::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId};
pub use sink::ArenaSink;
pub use text::{extract_text, html_to_plain_text, unescape_html};

/// Parse an HTML document (or fragment) into an [`ArenaDom`].
pub fn parse_html(html: &str) -> ArenaDom {
    parse_document(ArenaSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}
