use crate::convert::Options;
use crate::nodes::{DATA_TYPE, RAW_BLOCK_TYPE, RawBlock, RawBlockKind};
use crate::parsing::markup::{find_marked_elements, outermost};
use crate::parsing::span::Span;

use super::shape::BlockShape;

/// A range of the fragment taken by one shape rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Claim {
    span: Span,
    kind: RawBlockKind,
}

/// Replaces structurally fragile blocks with opaque wrappers.
///
/// Shapes are tried in [`BlockShape::PRIORITY`] order and candidates in
/// document order. A candidate inside (or crossing) an existing claim is
/// skipped, so a claimed span is never matched again and the outermost
/// qualifying element of a rule wins over nested ones. A qualifying candidate
/// that encloses earlier claims absorbs them; its payload still carries their
/// original bytes.
pub fn isolate_blocks(fragment: &str, options: &Options) -> String {
    let mut claims: Vec<Claim> = vec![];

    for shape in BlockShape::PRIORITY {
        for element in shape.candidates(fragment, options) {
            let outer = element.outer;
            let blocked = claims
                .iter()
                .any(|c| c.span.overlaps(outer) && !outer.strictly_contains(c.span));
            if blocked || !shape.qualifies(fragment, &element) {
                continue;
            }
            claims.retain(|c| !outer.contains(c.span));
            claims.push(Claim {
                span: outer,
                kind: shape.kind(),
            });
        }
    }

    if claims.is_empty() {
        return fragment.to_string();
    }
    claims.sort_by_key(|c| c.span.start);

    let mut out = String::with_capacity(fragment.len() * 3);
    let mut last = 0;
    for claim in &claims {
        out.push_str(&fragment[last..claim.span.start]);
        let block = RawBlock::new(claim.kind, claim.span.slice(fragment));
        out.push_str(&block.to_markup(options.labels.for_kind(claim.kind)));
        last = claim.span.end;
    }
    out.push_str(&fragment[last..]);

    log::debug!("Isolated {} structural blocks", claims.len());
    out
}

/// Splices the preserved markup of every opaque wrapper back in.
///
/// Whatever the editor shows inside a wrapper is discarded. A wrapper whose
/// payload is missing or undecodable falls back to its visible content.
pub fn deisolate_blocks(edited: &str) -> String {
    let wrappers = outermost(find_marked_elements(edited, DATA_TYPE, &[RAW_BLOCK_TYPE]));
    if wrappers.is_empty() {
        return edited.to_string();
    }

    let mut out = String::with_capacity(edited.len());
    let mut last = 0;
    for wrapper in &wrappers {
        out.push_str(&edited[last..wrapper.outer.start]);
        match RawBlock::from_tag(&wrapper.tag) {
            Some(block) => out.push_str(&block.original_markup),
            None => {
                log::warn!(
                    "Raw block at byte {} has no usable payload, keeping its visible content",
                    wrapper.outer.start
                );
                out.push_str(wrapper.inner.slice(edited));
            }
        }
        last = wrapper.outer.end;
    }
    out.push_str(&edited[last..]);

    log::debug!("Restored {} structural blocks", wrappers.len());
    out
}
