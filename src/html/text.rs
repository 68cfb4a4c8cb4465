//! Text extraction and plain-text rendering over the arena DOM.

use quick_xml::escape::resolve_html5_entity;

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};
use super::parse_html;
use crate::xml::{resolve_entity, unescape_with};

/// Elements whose text never reaches the reader.
fn is_hidden(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "template")
}

/// Concatenate every visible text node of `html` in document order.
pub fn extract_text(html: &str) -> String {
    let dom = parse_html(html);
    let mut out = String::new();
    collect_text(&dom, dom.document(), &mut out);
    out
}

fn collect_text(dom: &ArenaDom, id: ArenaNodeId, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        ArenaNodeData::Text(text) => out.push_str(text),
        ArenaNodeData::Element(name) if is_hidden(name.local.as_ref()) => {}
        ArenaNodeData::Document | ArenaNodeData::Element(_) => {
            for child in dom.children(id) {
                collect_text(dom, child, out);
            }
        }
        ArenaNodeData::Other => {}
    }
}

/// Decode HTML character references (`&amp;`, `&nbsp;`, `&#8217;`, ...).
///
/// Unknown references are left as written.
pub fn unescape_html(raw: &str) -> String {
    unescape_with(raw, |entity| {
        resolve_entity(entity).or_else(|| resolve_html5_entity(entity).map(str::to_string))
    })
    .into_owned()
}

/// Render HTML as readable plain text, ignoring links and images.
///
/// Block elements are separated by blank lines, list items get `*` or
/// numbered markers, bold and italic become `**` and `_`, and the result is
/// trimmed.
pub fn html_to_plain_text(html: &str) -> String {
    let dom = parse_html(html);
    let mut ctx = PlainTextContext::new(&dom);
    ctx.walk_children(dom.document());
    ctx.finish()
}

#[derive(Debug, Clone, Copy)]
struct ListContext {
    is_ordered: bool,
    counter: usize,
}

/// Pure string accumulation over the DOM.
struct PlainTextContext<'a> {
    dom: &'a ArenaDom,
    output: String,
    list_stack: Vec<ListContext>,
    /// Line breaks owed before the next content.
    pending_breaks: usize,
    pending_space: bool,
    at_line_start: bool,
    pre_depth: usize,
}

impl<'a> PlainTextContext<'a> {
    fn new(dom: &'a ArenaDom) -> Self {
        Self {
            dom,
            output: String::new(),
            list_stack: Vec::new(),
            pending_breaks: 0,
            pending_space: false,
            at_line_start: true,
            pre_depth: 0,
        }
    }

    fn finish(self) -> String {
        self.output.trim().to_string()
    }

    fn walk_children(&mut self, id: ArenaNodeId) {
        let dom = self.dom;
        for child in dom.children(id) {
            self.walk_node(child);
        }
    }

    fn walk_node(&mut self, id: ArenaNodeId) {
        let dom = self.dom;
        let Some(node) = dom.get(id) else {
            return;
        };

        let tag = match &node.data {
            ArenaNodeData::Text(text) => {
                self.write_text(text);
                return;
            }
            ArenaNodeData::Element(name) => name.local.as_ref(),
            ArenaNodeData::Document => {
                self.walk_children(id);
                return;
            }
            ArenaNodeData::Other => return,
        };

        match tag {
            "head" | "script" | "style" | "template" | "img" => {}

            "br" => self.break_lines(1),

            "hr" => {
                self.break_lines(2);
                self.write_raw("* * *");
                self.break_lines(2);
            }

            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                self.break_lines(2);
                self.write_raw(&format!("{} ", "#".repeat(level)));
                self.walk_children(id);
                self.break_lines(2);
            }

            "p" | "div" | "blockquote" | "section" | "article" | "header" | "footer"
            | "table" | "figure" | "dl" => {
                self.break_lines(2);
                self.walk_children(id);
                self.break_lines(2);
            }

            "pre" => {
                self.break_lines(2);
                self.pre_depth += 1;
                self.walk_children(id);
                self.pre_depth -= 1;
                self.break_lines(2);
            }

            "ul" | "ol" => {
                self.break_lines(if self.list_stack.is_empty() { 2 } else { 1 });
                self.list_stack.push(ListContext {
                    is_ordered: tag == "ol",
                    counter: 0,
                });
                self.walk_children(id);
                self.list_stack.pop();
                self.break_lines(if self.list_stack.is_empty() { 2 } else { 1 });
            }

            "li" => {
                self.break_lines(1);
                let depth = self.list_stack.len().max(1);
                let marker = match self.list_stack.last_mut() {
                    Some(ctx) if ctx.is_ordered => {
                        ctx.counter += 1;
                        format!("{}. ", ctx.counter)
                    }
                    _ => "* ".to_string(),
                };
                self.write_raw(&format!("{}{}", "  ".repeat(depth), marker));
                self.walk_children(id);
                self.break_lines(1);
            }

            "tr" | "dt" | "dd" => {
                self.break_lines(1);
                self.walk_children(id);
                self.break_lines(1);
            }

            "td" | "th" => {
                self.walk_children(id);
                self.pending_space = true;
            }

            "strong" | "b" => self.wrap_inline(id, "**"),
            "em" | "i" => self.wrap_inline(id, "_"),

            // Links keep their text only
            _ => self.walk_children(id),
        }
    }

    fn wrap_inline(&mut self, id: ArenaNodeId, marker: &str) {
        self.write_raw(marker);
        self.walk_children(id);
        self.output.push_str(marker);
    }

    /// Require at least `count` line breaks before the next content.
    fn break_lines(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
    }

    fn flush_breaks(&mut self) {
        if self.pending_breaks == 0 {
            return;
        }
        if !self.output.is_empty() {
            let trailing = self.output.len() - self.output.trim_end_matches('\n').len();
            for _ in trailing..self.pending_breaks {
                self.output.push('\n');
            }
            self.at_line_start = true;
        }
        self.pending_breaks = 0;
        self.pending_space = false;
    }

    /// Write markup that must start at the current position (markers, prefixes).
    fn write_raw(&mut self, text: &str) {
        self.flush_breaks();
        if self.pending_space && !self.at_line_start {
            self.output.push(' ');
        }
        self.pending_space = false;
        self.output.push_str(text);
        self.at_line_start = false;
    }

    fn write_text(&mut self, text: &str) {
        if self.pre_depth > 0 {
            self.flush_breaks();
            self.output.push_str(text);
            self.at_line_start = text.ends_with('\n');
            return;
        }

        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }

        for (i, word) in text.split_whitespace().enumerate() {
            if i > 0 {
                self.pending_space = true;
            }
            self.write_raw(word);
        }

        if text.ends_with(char::is_whitespace) {
            self.pending_space = true;
        }
    }
}
