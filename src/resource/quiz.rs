//! Quizzes (QTI 1.2 assessments).

use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::html::{html_to_plain_text, unescape_html};
use crate::manifest::NO_TITLE;
use crate::xml::Element;

/// QTI ASI 1.2 namespace.
pub const QTI_NAMESPACE: &str = "http://www.imsglobal.org/xsd/ims_qtiasiv1p2";

/// One question with its answer choices, both as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub choices: Vec<String>,
}

/// Read a QTI assessment file.
pub fn read_quiz(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    parse_quiz(&bytes)
}

/// Format an assessment: title, metadata fields and every question.
pub fn parse_quiz(bytes: &[u8]) -> Result<String> {
    let root = Element::parse_bytes(bytes)?;
    let assessment = root.require_child(QTI_NAMESPACE, "assessment")?;

    let title = assessment.attr("title").unwrap_or(NO_TITLE);
    let metadata = assessment
        .child(QTI_NAMESPACE, "qtimetadata")
        .map(metadata_fields)
        .unwrap_or_default();

    let section = assessment.require_child(QTI_NAMESPACE, "section")?;
    let mut questions = Vec::new();
    collect_questions(section, &mut questions);

    Ok(format!(
        "Assessment Title: {title}\nMetadata Fields: {}\nQuestions: {}\n\n",
        render_mapping(&metadata),
        render_questions(&questions)
    ))
}

/// Label/entry pairs in document order; a repeated label keeps its first
/// position and takes the last value.
fn metadata_fields(metadata: &Element) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = Vec::new();

    for field in metadata.children_named(QTI_NAMESPACE, "qtimetadatafield") {
        let Some(label) = field.child(QTI_NAMESPACE, "fieldlabel").map(Element::text) else {
            continue;
        };
        let entry = field
            .child(QTI_NAMESPACE, "fieldentry")
            .map(Element::text)
            .unwrap_or_default();

        match fields.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, value)) => *value = entry.to_string(),
            None => fields.push((label.to_string(), entry.to_string())),
        }
    }

    fields
}

/// Items directly in `section`, then those of nested sections (question groups), in order.
fn collect_questions(section: &Element, out: &mut Vec<Question>) {
    for child in section.children() {
        if child.is(QTI_NAMESPACE, "item") {
            out.push(parse_question(child));
        } else if child.is(QTI_NAMESPACE, "section") {
            collect_questions(child, out);
        }
    }
}

fn parse_question(item: &Element) -> Question {
    let presentation = item.child(QTI_NAMESPACE, "presentation");

    let prompt = presentation
        .and_then(|p| p.descend(QTI_NAMESPACE, &["material", "mattext"]))
        .map(|mattext| material_text(mattext.text()))
        .unwrap_or_default();

    let choices = presentation
        .and_then(|p| p.descend(QTI_NAMESPACE, &["response_lid", "render_choice"]))
        .map(|render| {
            render
                .children_named(QTI_NAMESPACE, "response_label")
                .map(|label| {
                    label
                        .descend(QTI_NAMESPACE, &["material", "mattext"])
                        .map(|mattext| material_text(mattext.text()))
                        .unwrap_or_default()
                })
                .collect()
        })
        .unwrap_or_default();

    Question { prompt, choices }
}

/// `mattext` holds escaped HTML: unescape, then flatten to plain text.
fn material_text(raw: &str) -> String {
    html_to_plain_text(&unescape_html(raw))
}

// ----------------------------------------------------------------------------
// Literal rendering
// ----------------------------------------------------------------------------

fn render_mapping(fields: &[(String, String)]) -> String {
    let entries: Vec<String> = fields
        .iter()
        .map(|(label, entry)| format!("{}: {}", quoted(label), quoted(entry)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

fn render_list(items: &[String]) -> String {
    let entries: Vec<String> = items.iter().map(|item| quoted(item)).collect();
    format!("[{}]", entries.join(", "))
}

fn render_questions(questions: &[Question]) -> String {
    let entries: Vec<String> = questions
        .iter()
        .map(|q| {
            format!(
                "{{'question': {}, 'choices': {}}}",
                quoted(&q.prompt),
                render_list(&q.choices)
            )
        })
        .collect();
    format!("[{}]", entries.join(", "))
}

/// Quote a string literal: single quotes unless the text contains a single
/// quote and no double quote; backslashes, the quote character and
/// non-printing characters are escaped.
fn quoted(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if is_non_printing(c) => {
                let code = c as u32;
                let _ = if code <= 0xff {
                    write!(out, "\\x{code:02x}")
                } else if code <= 0xffff {
                    write!(out, "\\u{code:04x}")
                } else {
                    write!(out, "\\U{code:08x}")
                };
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Control, format and separator characters, plus whitespace other than
/// the plain space.
fn is_non_printing(c: char) -> bool {
    c.is_control()
        || (c.is_whitespace() && c != ' ')
        || matches!(
            c,
            '\u{ad}'
                | '\u{600}'..='\u{605}'
                | '\u{61c}'
                | '\u{6dd}'
                | '\u{70f}'
                | '\u{8e2}'
                | '\u{180e}'
                | '\u{200b}'..='\u{200f}'
                | '\u{202a}'..='\u{202e}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{206f}'
                | '\u{feff}'
                | '\u{fff9}'..='\u{fffb}'
                | '\u{110bd}'
                | '\u{110cd}'
                | '\u{1d173}'..='\u{1d17a}'
                | '\u{e0001}'
                | '\u{e0020}'..='\u{e007f}'
        )
}
