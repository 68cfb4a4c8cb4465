//! Namespace-aware XML element tree.
//!
//! Manifests, web links, discussion topics and QTI assessments are all small
//! documents that are looked up by `(namespace, local name)` pairs, so they are
//! read once into an owned tree of [`Element`]s instead of being walked as an
//! event stream.

use std::borrow::Cow;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use crate::error::{Error, Result};
use crate::util::{decode_text, xml_encoding};

/// An XML element with its namespace resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Parse a document and return its root element.
    pub fn parse(content: &str) -> Result<Element> {
        let mut reader = NsReader::from_str(content);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_resolved_event()? {
                (ns, Event::Start(e)) => stack.push(open_element(&ns, &e)?),
                (ns, Event::Empty(e)) => {
                    let element = open_element(&ns, &e)?;
                    attach(&mut stack, &mut root, element);
                }
                (_, Event::End(_)) => {
                    if let Some(element) = stack.pop() {
                        attach(&mut stack, &mut root, element);
                    }
                }
                (_, Event::Text(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                (_, Event::CData(e)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                (_, Event::GeneralRef(e)) => {
                    if let Some(current) = stack.last_mut() {
                        let entity = String::from_utf8_lossy(e.as_ref());
                        match resolve_entity(&entity) {
                            Some(resolved) => current.text.push_str(&resolved),
                            None => {
                                current.text.push('&');
                                current.text.push_str(&entity);
                                current.text.push(';');
                            }
                        }
                    }
                }
                (_, Event::Eof) => break,
                _ => {}
            }
        }

        if let Some(unclosed) = stack.last() {
            return Err(Error::missing_element(format!("</{}>", unclosed.name)));
        }

        root.ok_or_else(|| Error::missing_element("document root"))
    }

    /// Parse raw file bytes in the encoding given by their BOM or XML
    /// declaration (UTF-8 when neither says otherwise).
    pub fn parse_bytes(bytes: &[u8]) -> Result<Element> {
        let encoding = xml_encoding(bytes);
        let content = decode_text(bytes, encoding)
            .ok_or_else(|| Error::Decode(encoding.unwrap_or("UTF-8").to_string()))?;
        Self::parse(&content)
    }

    /// Resolved namespace URI, if the element is in one.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local name without any prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this element is `{ns}name`.
    pub fn is(&self, ns: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(ns)
    }

    /// Attribute value by its (unprefixed) name, with entities resolved.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attribute that must be present.
    pub fn require_attr(&self, name: &str) -> Result<&str> {
        self.attr(name)
            .ok_or_else(|| Error::missing_attribute(&self.name, name))
    }

    /// Direct text content (child elements excluded).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// All child elements in document order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child element named `{ns}name`.
    pub fn child(&self, ns: &str, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(ns, name))
    }

    /// Child element that must be present.
    pub fn require_child(&self, ns: &str, name: &str) -> Result<&Element> {
        self.child(ns, name)
            .ok_or_else(|| Error::missing_element(format!("{name} in <{}>", self.name)))
    }

    /// Every child element named `{ns}name`, in document order.
    pub fn children_named<'a>(
        &'a self,
        ns: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(ns, name))
    }

    /// Follow a path of child names in one namespace, taking the first match at each step.
    pub fn descend(&self, ns: &str, path: &[&str]) -> Option<&Element> {
        path.iter()
            .try_fold(self, |element, name| element.child(ns, name))
    }
}

fn open_element(ns: &ResolveResult<'_>, e: &BytesStart<'_>) -> Result<Element> {
    let namespace = match ns {
        ResolveResult::Bound(namespace) => {
            Some(String::from_utf8_lossy(namespace.as_ref()).into_owned())
        }
        _ => None,
    };
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = unescape_with(&raw, resolve_entity).into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        namespace,
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

/// Resolve XML entity references.
pub(crate) fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#')
        && let Ok(code) = dec.parse::<u32>()
        && let Some(c) = char::from_u32(code)
    {
        return Some(c.to_string());
    }

    None
}

/// Replace `&name;` references using `resolve`, leaving unknown ones untouched.
///
/// Unlike `quick_xml::escape::unescape_with`, an unknown or malformed
/// reference is kept as written instead of failing the whole value.
pub(crate) fn unescape_with<F>(raw: &str, resolve: F) -> Cow<'_, str>
where
    F: Fn(&str) -> Option<String>,
{
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        // Entity names are short; a distant ';' belongs to something else.
        let resolved = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 32)
            .and_then(|semi| resolve(&after[..semi]).map(|text| (text, semi)));

        match resolved {
            Some((text, semi)) => {
                out.push_str(&text);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}
