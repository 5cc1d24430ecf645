use crate::nodes::{AtomicNode, BlockKind, BlockMarker, Expression, is_identifier, is_valid_name};
use crate::parsing::markup::{find_elements_by, outermost, scan_declaration, scan_tag};
use crate::parsing::span::Span;

use super::{cursor::Cursor, types::InlineNode};

/// Scans a fragment into a sequence of [`InlineNode`]s.
///
/// # Raw Zone Precedence
/// Existing atomic units are checked first and nothing inside them is
/// scanned. Tags and comments are skipped whole, so a construct inside an
/// attribute value stays literal text.
///
/// # Returns
/// Nodes covering the entire input. Text between constructs is emitted as
/// `InlineNode::Text`.
pub fn parse_inline(s: &str) -> Vec<InlineNode> {
    let zones = raw_zones(s);
    let mut next_zone = 0;
    let mut cur = Cursor::new(s);
    let mut out = vec![];
    let mut text_start = cur.pos();

    fn flush_text(out: &mut Vec<InlineNode>, start: usize, end: usize) {
        if end > start {
            out.push(InlineNode::Text(Span { start, end }));
        }
    }

    while !cur.eof() {
        while next_zone < zones.len() && zones[next_zone].start < cur.pos() {
            next_zone += 1;
        }
        if let Some(&zone) = zones.get(next_zone)
            && zone.start == cur.pos()
        {
            flush_text(&mut out, text_start, zone.start);
            out.push(InlineNode::RawZone(zone));
            text_start = zone.end;
            cur.jump_to(zone.end);
            next_zone += 1;
            continue;
        }
        if let Some(end) = markup_end(s, cur.pos()) {
            cur.jump_to(end);
            continue;
        }
        if let Some(node) =
            try_parse_expression(&mut cur).or_else(|| try_parse_block_marker(&mut cur))
        {
            let full = node.span();
            flush_text(&mut out, text_start, full.start);
            text_start = full.end;
            out.push(node);
            continue;
        }
        cur.bump();
    }

    flush_text(&mut out, text_start, cur.pos());
    out
}

/// True if a block marker occurs anywhere in `s` outside tags and raw zones.
pub fn contains_block_marker(s: &str) -> bool {
    parse_inline(s)
        .iter()
        .any(|n| matches!(n, InlineNode::BlockMarker { .. }))
}

/// True if the first non-whitespace content of `s` is a block marker.
pub fn starts_with_block_marker(s: &str) -> bool {
    let mut cur = Cursor::new(s.trim_start());
    try_parse_block_marker(&mut cur).is_some()
}

/// Spans of the outermost atomic units already present in `s`.
fn raw_zones(s: &str) -> Vec<Span> {
    outermost(find_elements_by(s, AtomicNode::is_marked))
        .into_iter()
        .map(|el| el.outer)
        .collect()
}

/// End of the tag or comment starting at `at`, if one does.
fn markup_end(s: &str, at: usize) -> Option<usize> {
    if s.as_bytes().get(at) != Some(&b'<') {
        return None;
    }
    scan_declaration(s, at)
        .map(|decl| decl.end)
        .or_else(|| scan_tag(s, at).map(|tag| tag.span.end))
}

/// Finds the start of `close`, giving up at a nested `reopen` or at markup.
///
/// A construct never spans a tag boundary; `a < b` is still plain text.
fn find_close(s: &str, from: usize, close: &[u8], reopen: &[u8]) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut j = from;
    while j < bytes.len() {
        let rest = &bytes[j..];
        if rest.starts_with(close) {
            return Some(j);
        }
        if rest.starts_with(reopen) || markup_end(s, j).is_some() {
            return None;
        }
        j += 1;
    }
    None
}

/// Narrows `[start, end)` to exclude surrounding whitespace.
fn trim_span(s: &str, start: usize, end: usize) -> Span {
    let slice = &s[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let len = slice.trim().len();
    Span::new(start + lead, start + lead + len)
}

/// Attempts to parse `{{ name }}` or `{{ name | filter }}` at the cursor.
///
/// Returns `None` if not at `{{`, if the expression isn't closed, or if the
/// name or filter is malformed. The cursor only moves on success.
fn try_parse_expression(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if !cur.starts_with(Expression::OPEN) {
        return None;
    }

    let s = cur.s;
    let start = cur.pos();
    let inner_start = start + Expression::OPEN.len();
    let close = find_close(s, inner_start, Expression::CLOSE, Expression::OPEN)?;

    let pipe = s[inner_start..close]
        .bytes()
        .position(|b| b == Expression::PIPE)
        .map(|p| inner_start + p);

    let (name, filter) = match pipe {
        Some(p) => (
            trim_span(s, inner_start, p),
            Some(trim_span(s, p + 1, close)),
        ),
        None => (trim_span(s, inner_start, close), None),
    };

    if !is_valid_name(name.slice(s)) {
        return None;
    }
    if let Some(f) = filter
        && !is_identifier(f.slice(s))
    {
        return None;
    }

    let end = close + Expression::CLOSE.len();
    cur.jump_to(end);

    Some(InlineNode::Expression {
        full: Span { start, end },
        name,
        filter,
    })
}

/// Attempts to parse `{% kind clause %}` at the cursor.
///
/// The kind must be one of the six control keywords, followed by whitespace
/// or the closing delimiter. The cursor only moves on success.
fn try_parse_block_marker(cur: &mut Cursor<'_>) -> Option<InlineNode> {
    if !cur.starts_with(BlockMarker::OPEN) {
        return None;
    }

    let s = cur.s;
    let start = cur.pos();
    let inner_start = start + BlockMarker::OPEN.len();
    let close = find_close(s, inner_start, BlockMarker::CLOSE, BlockMarker::OPEN)?;
    let inner = trim_span(s, inner_start, close);

    let word_len = inner
        .slice(s)
        .bytes()
        .take_while(u8::is_ascii_alphabetic)
        .count();
    let word_end = inner.start + word_len;
    let boundary_ok = word_end == inner.end || s.as_bytes()[word_end].is_ascii_whitespace();
    if !boundary_ok {
        return None;
    }
    let kind: BlockKind = s[inner.start..word_end].parse().ok()?;
    let clause = trim_span(s, word_end, inner.end);

    let end = close + BlockMarker::CLOSE.len();
    cur.jump_to(end);

    Some(InlineNode::BlockMarker {
        full: Span { start, end },
        kind,
        clause,
    })
}
