//! Load/save round-trip verification for stored templates.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::convert::Converter;
use crate::nodes::{BlockMarker, Expression};
use crate::parsing::inline::InlineNode;
use crate::parsing::{WrapperState, normalize_page_breaks, parse_inline};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern compiles"));

static BETWEEN_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("between-tags pattern compiles"));

/// Outcome of loading a stored value into the editor and saving it unedited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RoundTrip {
    /// Saved bytes equal the stored bytes.
    Identical,
    /// Differences are limited to whitespace, delimiter spacing and page
    /// break form.
    Normalized,
    /// The saved value differs in content.
    Changed {
        /// Byte offset into the stored value where the saved value diverges.
        first_difference: usize,
    },
}

impl RoundTrip {
    pub fn is_changed(&self) -> bool {
        matches!(self, RoundTrip::Changed { .. })
    }
}

/// Converts `stored` to the editable form and back with no edits in between.
pub fn check_round_trip(stored: &str, converter: &Converter) -> RoundTrip {
    let wrapper = WrapperState::capture(stored);
    let saved = converter.to_stored(&converter.to_editable(stored), &wrapper);

    if saved == stored {
        return RoundTrip::Identical;
    }
    let class = &converter.options().page_break_class;
    if canonical(stored, class) == canonical(&saved, class) {
        return RoundTrip::Normalized;
    }

    let first_difference = stored
        .char_indices()
        .zip(saved.chars())
        .find(|((_, a), b)| a != b)
        .map(|((i, _), _)| i)
        .unwrap_or_else(|| stored.len().min(saved.len()));
    log::warn!("Round trip changed content at byte {first_difference}");
    RoundTrip::Changed { first_difference }
}

/// Rewrites constructs to their canonical syntax and collapses whitespace.
fn canonical(s: &str, page_break_class: &str) -> String {
    let s = normalize_page_breaks(s, page_break_class);
    let mut out = String::with_capacity(s.len());
    for node in parse_inline(&s) {
        match node {
            InlineNode::Expression { name, filter, .. } => {
                let filter = filter.map(|f| f.slice(&s).to_string());
                out.push_str(&Expression::new(name.slice(&s), filter).to_template());
            }
            InlineNode::BlockMarker { kind, clause, .. } => {
                out.push_str(&BlockMarker::new(kind, clause.slice(&s)).to_template());
            }
            InlineNode::Text(sp) | InlineNode::RawZone(sp) => out.push_str(sp.slice(&s)),
        }
    }
    let collapsed = WHITESPACE.replace_all(out.trim(), " ");
    BETWEEN_TAGS.replace_all(&collapsed, "><").into_owned()
}
