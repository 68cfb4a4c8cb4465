//! Byte-to-text decoding shared by the XML and HTML readers.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};

/// Decode document bytes to text.
///
/// 1. A byte order mark decides the encoding outright.
/// 2. Valid UTF-8 is taken as is.
/// 3. Otherwise the `hint` label (from `<?xml encoding?>` or `<meta charset>`)
///    is used; `None` is returned if the bytes are malformed in it.
/// 4. Without a usable hint, Windows-1252 (a superset of ISO-8859-1).
pub(crate) fn decode_text<'a>(bytes: &'a [u8], hint: Option<&str>) -> Option<Cow<'a, str>> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, malformed) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (!malformed).then_some(text);
    }

    let (text, malformed) = UTF_8.decode_without_bom_handling(bytes);
    if !malformed {
        return Some(text);
    }

    let encoding = hint
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .unwrap_or(WINDOWS_1252);
    let (text, malformed) = encoding.decode_without_bom_handling(bytes);
    (!malformed).then_some(text)
}

/// Encoding named in a leading `<?xml ... encoding="..."?>` declaration.
pub(crate) fn xml_encoding(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(100)];
    let decl_start = find(prefix, b"<?xml")?;
    let decl = &prefix[decl_start..];
    let decl = &decl[..find(decl, b"?>").unwrap_or(decl.len())];

    let enc_pos = decl
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after = &decl[enc_pos + 9..];

    let quote = *after.first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let end = after[1..].iter().position(|&b| b == quote)?;
    std::str::from_utf8(&after[1..1 + end]).ok()
}

/// Charset declared by an HTML page, either `<meta charset="...">` or the
/// `charset=` parameter of an `http-equiv` content type. Only the first
/// kilobyte is searched.
pub(crate) fn html_charset(bytes: &[u8]) -> Option<&str> {
    let prefix = &bytes[..bytes.len().min(1024)];
    let pos = prefix
        .windows(8)
        .position(|w| w.eq_ignore_ascii_case(b"charset="))?;

    let mut value = &prefix[pos + 8..];
    if let Some(&quote) = value.first()
        && (quote == b'"' || quote == b'\'')
    {
        value = &value[1..];
    }
    let end = value
        .iter()
        .position(|&b| matches!(b, b'"' | b'\'' | b';' | b'>' | b'/') || b.is_ascii_whitespace())
        .unwrap_or(value.len());

    std::str::from_utf8(&value[..end]).ok().filter(|s| !s.is_empty())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_and_bom() {
        assert_eq!(decode_text(b"caf\xC3\xA9", None).as_deref(), Some("café"));
        assert_eq!(decode_text(b"\xEF\xBB\xBFhi", None).as_deref(), Some("hi"));
        assert_eq!(decode_text(b"\xFF\xFEh\x00i\x00", None).as_deref(), Some("hi"));
    }

    #[test]
    fn test_decode_with_hint() {
        assert_eq!(decode_text(b"caf\xE9", Some("ISO-8859-1")).as_deref(), Some("café"));
        assert_eq!(
            decode_text(b"\x93quoted\x94", Some("windows-1252")).as_deref(),
            Some("\u{201c}quoted\u{201d}")
        );
    }

    #[test]
    fn test_decode_falls_back_to_windows_1252() {
        assert_eq!(decode_text(b"na\xEFve", None).as_deref(), Some("naïve"));
        assert_eq!(decode_text(b"na\xEFve", Some("no-such-charset")).as_deref(), Some("naïve"));
    }

    #[test]
    fn test_decode_malformed_in_declared_encoding() {
        assert_eq!(decode_text(b"bad \xFF\xFE byte", Some("utf-8")), None);
    }

    #[test]
    fn test_xml_encoding() {
        assert_eq!(
            xml_encoding(br#"<?xml version="1.0" encoding="ISO-8859-1"?><a/>"#),
            Some("ISO-8859-1")
        );
        assert_eq!(xml_encoding(b"<?xml version='1.0' encoding='utf-8'?>"), Some("utf-8"));
        assert_eq!(xml_encoding(br#"<?xml version="1.0"?><a encoding="x"/>"#), None);
        assert_eq!(xml_encoding(b"<a/>"), None);
    }

    #[test]
    fn test_html_charset() {
        assert_eq!(
            html_charset(br#"<html><head><meta charset="windows-1252"></head>"#),
            Some("windows-1252")
        );
        assert_eq!(
            html_charset(
                br#"<meta http-equiv="Content-Type" content="text/html; charset=ISO-8859-1">"#
            ),
            Some("ISO-8859-1")
        );
        assert_eq!(html_charset(b"<meta charset=utf-8>"), Some("utf-8"));
        assert_eq!(html_charset(b"<p>no charset here</p>"), None);
    }
}
