use html_escape::decode_html_entities;

use crate::parsing::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<div ...>`
    Open,
    /// `</div>`
    Close,
    /// `<div ... />`
    SelfClosing,
}

/// A single scanned tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lower-cased tag name.
    pub name: String,
    pub kind: TagKind,
    /// Attributes in source order. Names are lower-cased, values entity-decoded.
    pub attrs: Vec<(String, String)>,
    /// Full span from `<` to `>` inclusive.
    pub span: Span,
}

impl Tag {
    /// Returns the decoded value of an attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`Tag::attr`] but treats an empty value as absent.
    pub fn non_empty_attr(&self, name: &str) -> Option<&str> {
        self.attr(name).filter(|v| !v.is_empty())
    }

    /// True if the whitespace-separated `class` list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }
}

/// Scans a `<!-- comment -->` or `<!DOCTYPE ...>` style declaration at `at`.
///
/// Returns the span of the whole construct. An unterminated comment is not
/// recognised.
pub fn scan_declaration(s: &str, at: usize) -> Option<Span> {
    let rest = s.get(at..)?;
    if rest.starts_with("<!--") {
        let close = rest[4..].find("-->")?;
        return Some(Span::new(at, at + 4 + close + 3));
    }
    if rest.starts_with("<!") {
        let close = rest.find('>')?;
        return Some(Span::new(at, at + close + 1));
    }
    None
}

/// Scans a tag starting at byte `at`.
///
/// Returns `None` when `at` does not start a well-formed tag.
pub fn scan_tag(s: &str, at: usize) -> Option<Tag> {
    let bytes = s.as_bytes();
    if bytes.get(at) != Some(&b'<') {
        return None;
    }

    let mut i = at + 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }

    if !bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    let name_start = i;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    let name = s[name_start..i].to_ascii_lowercase();

    if closing {
        let close = s[i..].find('>')?;
        return Some(Tag {
            name,
            kind: TagKind::Close,
            attrs: vec![],
            span: Span::new(at, i + close + 1),
        });
    }

    let mut attrs = vec![];
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i) {
            None => return None,
            Some(b'>') => {
                return Some(Tag {
                    name,
                    kind: TagKind::Open,
                    attrs,
                    span: Span::new(at, i + 1),
                });
            }
            Some(b'/') if bytes.get(i + 1) == Some(&b'>') => {
                return Some(Tag {
                    name,
                    kind: TagKind::SelfClosing,
                    attrs,
                    span: Span::new(at, i + 2),
                });
            }
            Some(b'/') => {
                i += 1;
                continue;
            }
            Some(_) => {}
        }

        let attr_start = i;
        while i < bytes.len() && !is_attr_name_end(bytes[i]) {
            i += 1;
        }
        if i == attr_start {
            // A stray '=' or quote with no name in front of it
            i += 1;
            continue;
        }
        let attr_name = s[attr_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if bytes.get(i) != Some(&b'=') {
            attrs.push((attr_name, String::new()));
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }

        let raw = match bytes.get(i) {
            None => return None,
            Some(&q) if q == b'"' || q == b'\'' => {
                let close = s[i + 1..].find(q as char)?;
                let value = &s[i + 1..i + 1 + close];
                i += close + 2;
                value
            }
            Some(_) => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &s[value_start..i]
            }
        };
        attrs.push((attr_name, decode_html_entities(raw).into_owned()));
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b':' || b == b'_'
}

fn is_attr_name_end(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'=' || b == b'>' || b == b'/'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn open_tag_with_attributes() {
        let tag = scan_tag(r#"<td class="a b" data-x='1' hidden>"#, 0).unwrap();
        assert_eq!(tag.name, "td");
        assert_eq!(tag.kind, TagKind::Open);
        assert_eq!(tag.attr("class"), Some("a b"));
        assert_eq!(tag.attr("data-x"), Some("1"));
        assert_eq!(tag.attr("hidden"), Some(""));
        assert!(tag.has_class("b"));
        assert!(!tag.has_class("c"));
    }

    #[test]
    fn close_tag() {
        let tag = scan_tag("</TABLE >", 0).unwrap();
        assert_eq!(tag.name, "table");
        assert_eq!(tag.kind, TagKind::Close);
        assert_eq!(tag.span, Span::new(0, 9));
    }

    #[test]
    fn self_closing_tag() {
        let tag = scan_tag(r#"<div class="page-break" />"#, 0).unwrap();
        assert_eq!(tag.kind, TagKind::SelfClosing);
        assert!(tag.has_class("page-break"));
    }

    #[test]
    fn attribute_values_are_entity_decoded() {
        let tag = scan_tag(r#"<span data-clause="a &gt; 1 and b == &quot;x&quot;">"#, 0).unwrap();
        assert_eq!(tag.attr("data-clause"), Some(r#"a > 1 and b == "x""#));
    }

    #[test]
    fn unquoted_attribute_value() {
        let tag = scan_tag("<td colspan=2>", 0).unwrap();
        assert_eq!(tag.attr("colspan"), Some("2"));
    }

    #[test]
    fn less_than_in_text_is_not_a_tag() {
        assert!(scan_tag("a < b", 2).is_none());
        assert!(scan_tag("<3", 0).is_none());
    }

    #[test]
    fn unterminated_tag_is_not_recognised() {
        assert!(scan_tag(r#"<div class="x"#, 0).is_none());
        assert!(scan_tag("<div", 0).is_none());
    }

    #[test]
    fn comment_and_doctype_declarations() {
        let s = "<!-- {{ x }} --><!DOCTYPE html>";
        assert_eq!(scan_declaration(s, 0), Some(Span::new(0, 16)));
        assert_eq!(scan_declaration(s, 16), Some(Span::new(16, 31)));
        assert_eq!(scan_declaration("<!-- open", 0), None);
    }
}
