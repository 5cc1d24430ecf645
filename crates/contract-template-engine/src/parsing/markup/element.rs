use std::collections::HashMap;

use crate::parsing::span::Span;

use super::tag::{Tag, TagKind, scan_declaration, scan_tag};

/// An element located in a markup string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The opening (or self-closing) tag.
    pub tag: Tag,
    /// From the `<` of the opening tag to the `>` of the matching close tag.
    pub outer: Span,
    /// Content between the tags. Empty for self-closing elements.
    pub inner: Span,
}

/// Finds every element named `name`, nested ones included, in document order.
pub fn find_elements(s: &str, name: &str) -> Vec<Element> {
    find_elements_by(s, |tag| tag.name == name)
}

/// Finds every element whose opening tag satisfies `pred`.
///
/// Open tags are tracked on one stack per tag name, so void elements such as
/// `<br>` that never close cannot disturb the pairing of other names. The
/// result is sorted by start offset; an enclosing element precedes the
/// elements nested inside it.
pub fn find_elements_by(s: &str, pred: impl Fn(&Tag) -> bool) -> Vec<Element> {
    let bytes = s.as_bytes();
    let mut stacks: HashMap<String, Vec<(Tag, bool)>> = HashMap::new();
    let mut out = vec![];
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        if let Some(decl) = scan_declaration(s, i) {
            i = decl.end;
            continue;
        }
        let Some(tag) = scan_tag(s, i) else {
            i += 1;
            continue;
        };
        i = tag.span.end;

        match tag.kind {
            TagKind::Open => {
                let matched = pred(&tag);
                stacks
                    .entry(tag.name.clone())
                    .or_default()
                    .push((tag, matched));
            }
            TagKind::SelfClosing => {
                if pred(&tag) {
                    let end = tag.span.end;
                    out.push(Element {
                        outer: tag.span,
                        inner: Span::new(end, end),
                        tag,
                    });
                }
            }
            TagKind::Close => {
                let Some((open, matched)) = stacks.get_mut(&tag.name).and_then(Vec::pop) else {
                    continue;
                };
                if matched {
                    out.push(Element {
                        outer: Span::new(open.span.start, tag.span.end),
                        inner: Span::new(open.span.end, tag.span.start),
                        tag: open,
                    });
                }
            }
        }
    }

    out.sort_by_key(|el| (el.outer.start, std::cmp::Reverse(el.outer.end)));
    out
}

/// Finds every element, of any tag name, whose `attr` is one of `values`.
pub fn find_marked_elements(s: &str, attr: &str, values: &[&str]) -> Vec<Element> {
    find_elements_by(s, |tag| tag.attr(attr).is_some_and(|v| values.contains(&v)))
}

/// Drops every element nested inside an earlier one.
///
/// Expects the document-ordered output of [`find_elements_by`].
pub fn outermost(elements: Vec<Element>) -> Vec<Element> {
    let mut out: Vec<Element> = Vec::with_capacity(elements.len());
    for el in elements {
        if out.last().is_some_and(|prev| prev.outer.overlaps(el.outer)) {
            continue;
        }
        out.push(el);
    }
    out
}
