//! # Conversion Pipeline
//!
//! Ties the passes together in the two directions:
//!
//! ```text
//! stored ─ extract_body ─ isolate_blocks ─ normalize_page_breaks ─ tag_inline ─▶ editable
//! editable ─ untag_inline ─ normalize_page_breaks ─ deisolate_blocks ─ reconstruct ─▶ stored
//! ```
//!
//! Isolation runs before tagging so the loop markers inside a protected table
//! are never tagged individually. Page breaks are normalized after isolation
//! so isolated markup stays byte-identical.

use serde::{Deserialize, Serialize};

use crate::nodes::{PAGE_BREAK_CLASS, RawBlockKind};
use crate::parsing::{
    WrapperState, deisolate_blocks, extract_body, isolate_blocks, normalize_page_breaks,
    tag_inline, untag_inline,
};

/// Visible text shown inside isolated block wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub table: String,
    pub list: String,
    pub signature: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            table: "Protected table".to_string(),
            list: "Protected list".to_string(),
            signature: "Signature section".to_string(),
        }
    }
}

impl Labels {
    pub fn for_kind(&self, kind: RawBlockKind) -> &str {
        match kind {
            RawBlockKind::Table => &self.table,
            RawBlockKind::List => &self.list,
            RawBlockKind::Signature => &self.signature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Class of the container isolated as the signature section.
    pub signature_class: String,
    /// Class of the empty `div` used as a page break marker.
    pub page_break_class: String,
    pub labels: Labels,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            signature_class: "signature-section".to_string(),
            page_break_class: PAGE_BREAK_CLASS.to_string(),
            labels: Labels::default(),
        }
    }
}

/// Converts between the stored template and the editor's representation.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: Options,
}

impl Converter {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Produces the fragment handed to the rich-text engine.
    ///
    /// The wrapper state needed to save it again is captured separately with
    /// [`WrapperState::capture`].
    pub fn to_editable(&self, stored: &str) -> String {
        let body = extract_body(stored);
        let isolated = isolate_blocks(body, &self.options);
        let normalized = normalize_page_breaks(&isolated, &self.options.page_break_class);
        let editable = tag_inline(&normalized);
        log::debug!(
            "Converted {} stored bytes to {} editable bytes",
            stored.len(),
            editable.len()
        );
        editable
    }

    /// Produces the value to persist from the editor's current content.
    pub fn to_stored(&self, editable: &str, wrapper: &WrapperState) -> String {
        let untagged = untag_inline(editable);
        let normalized = normalize_page_breaks(&untagged, &self.options.page_break_class);
        let body = deisolate_blocks(&normalized);
        wrapper.reconstruct(&body)
    }
}

/// [`Converter::to_editable`] with default options.
pub fn to_editable(stored: &str) -> String {
    Converter::default().to_editable(stored)
}

/// [`Converter::to_stored`] with default options.
pub fn to_stored(editable: &str, wrapper: &WrapperState) -> String {
    Converter::default().to_stored(editable, wrapper)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn round_trip(stored: &str) -> String {
        to_stored(&to_editable(stored), &WrapperState::capture(stored))
    }

    #[test]
    fn expression_becomes_one_atomic_unit() {
        let editable = to_editable("{{ tenant.name }}");
        insta::assert_snapshot!(
            editable,
            @r#"<span data-type="template-variable" data-name="tenant.name" contenteditable="false" class="template-variable">{{ tenant.name }}</span>"#
        );
        assert_eq!(round_trip("{{ tenant.name }}"), "{{ tenant.name }}");
    }

    #[test]
    fn filtered_expression_round_trips() {
        assert_eq!(
            round_trip("{{ rental_value | currency }}"),
            "{{ rental_value | currency }}"
        );
    }

    #[test]
    fn loop_table_round_trips_byte_identical() {
        let s = "<table><tr>{% for t in tenants %}<td>{{ t.name }}</td>{% endfor %}</tr></table>";
        let editable = to_editable(s);
        assert!(!editable.contains("template-variable"));
        assert_eq!(round_trip(s), s);
    }

    #[test]
    fn page_break_forms_share_one_representation() {
        let self_closing = to_editable(r#"<p>a</p><div class="page-break" />"#);
        let open_close = to_editable(r#"<p>a</p><div class="page-break"></div>"#);
        assert_eq!(self_closing, open_close);
        assert_eq!(
            round_trip(r#"<div class="page-break" />"#),
            r#"<div class="page-break"></div>"#
        );
    }

    #[test]
    fn page_break_inside_isolated_block_is_untouched() {
        let s = r#"<div class="signature-section"><div class="page-break" /><p>Sign</p></div>"#;
        assert_eq!(round_trip(s), s);
    }

    #[test]
    fn custom_options_flow_through() {
        let converter = Converter::new(Options {
            signature_class: "assinaturas".into(),
            page_break_class: "quebra".into(),
            labels: Labels {
                signature: "Assinaturas".into(),
                ..Labels::default()
            },
        });
        let s = r#"<div class="quebra"/><section class="assinaturas">{{ x }}</section>"#;
        let editable = converter.to_editable(s);
        assert!(editable.starts_with(
            r#"<div class="quebra"></div><div data-type="raw-block" data-raw-kind="signature""#
        ));
        assert!(editable.contains(">Assinaturas</div>"));
        let stored = converter.to_stored(&editable, &WrapperState::default());
        assert_eq!(
            stored,
            r#"<div class="quebra"></div><section class="assinaturas">{{ x }}</section>"#
        );
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: Options = serde_json::from_str(r#"{"signature_class":"sig"}"#).unwrap();
        assert_eq!(options.signature_class, "sig");
        assert_eq!(options.page_break_class, "page-break");
        assert_eq!(options.labels, Labels::default());
    }
}
