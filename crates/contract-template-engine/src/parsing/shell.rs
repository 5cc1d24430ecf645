//! Full-document detection, body extraction and shell reconstruction.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::parsing::markup::{TagKind, scan_declaration, scan_tag};

static DOCTYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<!doctype\b").expect("doctype pattern compiles")
});

/// True if the input carries a doctype declaration.
pub fn is_full_document(input: &str) -> bool {
    DOCTYPE.is_match(input)
}

/// Byte range of the first body element's content, untrimmed.
///
/// Comments, tag attribute values and `script`/`style` contents are skipped,
/// so a `<body>` written inside any of them is not taken for the real one.
fn body_content_range(doc: &str) -> Option<Range<usize>> {
    let mut content_start = None;
    let mut i = 0;
    while let Some(offset) = doc[i..].find('<') {
        let at = i + offset;
        if let Some(decl) = scan_declaration(doc, at) {
            i = decl.end;
            continue;
        }
        let Some(tag) = scan_tag(doc, at) else {
            i = at + 1;
            continue;
        };
        i = tag.span.end;
        match (tag.name.as_str(), tag.kind, content_start) {
            ("body", TagKind::Open, None) => content_start = Some(tag.span.end),
            ("body", TagKind::Close, Some(start)) => return Some(start..tag.span.start),
            ("script" | "style", TagKind::Open, _) => i = raw_text_end(doc, i, &tag.name),
            _ => {}
        }
    }
    None
}

/// Start of the close tag ending a raw-text element whose content begins at `from`.
fn raw_text_end(doc: &str, from: usize, name: &str) -> usize {
    doc[from..]
        .to_ascii_lowercase()
        .find(&format!("</{name}"))
        .map_or(doc.len(), |offset| from + offset)
}

/// Returns the trimmed body content of a full document.
///
/// Fragments, and full documents without a body element, come back unchanged.
pub fn extract_body(input: &str) -> &str {
    if !is_full_document(input) {
        return input;
    }
    match body_content_range(input) {
        Some(range) => input[range].trim(),
        None => {
            log::warn!("Document has a doctype but no body element, editing it whole");
            input
        }
    }
}

/// Puts `edited_body` back into the body of `original_shell`.
///
/// Everything outside the body content is kept verbatim, including the body
/// tag's own attributes and the whitespace that surrounded the original
/// content. The edited text is spliced literally.
pub fn reconstruct_document(original_shell: &str, edited_body: &str) -> String {
    if !is_full_document(original_shell) {
        return edited_body.to_string();
    }
    let Some(range) = body_content_range(original_shell) else {
        return edited_body.to_string();
    };

    let content = &original_shell[range.clone()];
    let lead = &content[..content.len() - content.trim_start().len()];
    let trail = &content[content.trim_end().len()..];

    let capacity = original_shell.len() - content.len() + edited_body.len();
    let mut out = String::with_capacity(capacity);
    out.push_str(&original_shell[..range.start]);
    if !content.trim().is_empty() {
        out.push_str(lead);
    }
    out.push_str(edited_body);
    out.push_str(trail);
    out.push_str(&original_shell[range.end..]);
    out
}

/// What was stripped from a stored value on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrapperState {
    pub is_full_document: bool,
    /// The complete original document, kept only for full documents.
    pub original_shell: Option<String>,
}

impl WrapperState {
    pub fn capture(stored: &str) -> Self {
        if is_full_document(stored) {
            Self {
                is_full_document: true,
                original_shell: Some(stored.to_string()),
            }
        } else {
            Self::default()
        }
    }

    pub fn reconstruct(&self, edited_body: &str) -> String {
        match &self.original_shell {
            Some(shell) if self.is_full_document => reconstruct_document(shell, edited_body),
            _ => edited_body.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const DOC: &str = "<!DOCTYPE html>\n<html>\n<head><style>body { font: 12pt serif; }</style></head>\n<body class=\"contract\" style=\"margin: 2cm\">\n  <p>Dear {{ tenant.name }},</p>\n</body>\n</html>\n";

    #[rstest]
    #[case("<!DOCTYPE html><html></html>", true)]
    #[case("<!doctype html><p>x</p>", true)]
    #[case("<p>fragment</p>", false)]
    #[case("<p>&lt;!DOCTYPE html&gt;</p>", false)]
    fn detects_full_documents(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_full_document(input), expected);
    }

    #[test]
    fn extracts_trimmed_body() {
        assert_eq!(extract_body(DOC), "<p>Dear {{ tenant.name }},</p>");
    }

    #[test]
    fn fragment_is_its_own_body() {
        assert_eq!(extract_body("  <p>x</p>\n"), "  <p>x</p>\n");
    }

    #[test]
    fn doctype_without_body_fails_soft() {
        let s = "<!DOCTYPE html><p>no body</p>";
        assert_eq!(extract_body(s), s);
    }

    #[rstest]
    #[case::head_comment("<!DOCTYPE html><html><head><!-- <body>old</body> --></head><body><p>x</p></body></html>")]
    #[case::attribute_value(r#"<!DOCTYPE html><html><head><meta name="x" content="<body>"></head><body><p>x</p></body></html>"#)]
    #[case::script("<!DOCTYPE html><html><head><script>let s = '<body>a</body>';</script></head><body><p>x</p></body></html>")]
    #[case::uppercase("<!DOCTYPE html><HTML><BODY class=\"c\"><p>x</p></BODY></HTML>")]
    fn body_is_found_past_head_content(#[case] doc: &str) {
        assert_eq!(extract_body(doc), "<p>x</p>");
        assert_eq!(reconstruct_document(doc, "<p>x</p>"), doc);
    }

    #[test]
    fn unedited_document_round_trips_exactly() {
        assert_eq!(reconstruct_document(DOC, extract_body(DOC)), DOC);
    }

    #[test]
    fn keeps_head_and_body_attributes() {
        let out = reconstruct_document(DOC, "<p>Changed</p>");
        assert!(out.starts_with("<!DOCTYPE html>\n<html>\n<head><style>"));
        assert!(out.contains(
            "<body class=\"contract\" style=\"margin: 2cm\">\n  <p>Changed</p>\n</body>"
        ));
    }

    #[test]
    fn edited_body_is_spliced_literally() {
        let out = reconstruct_document(DOC, "<p>Cost: $1 and ${name}</p>");
        assert!(out.contains("<p>Cost: $1 and ${name}</p>"));
    }

    #[test]
    fn non_document_shell_returns_edited_body() {
        assert_eq!(reconstruct_document("<p>old</p>", "<p>new</p>"), "<p>new</p>");
    }

    #[test]
    fn empty_body_gets_content_inserted() {
        let shell = "<!DOCTYPE html><html><body></body></html>";
        assert_eq!(
            reconstruct_document(shell, "<p>x</p>"),
            "<!DOCTYPE html><html><body><p>x</p></body></html>"
        );
    }

    #[test]
    fn wrapper_state_capture() {
        let full = WrapperState::capture(DOC);
        assert!(full.is_full_document);
        assert_eq!(full.original_shell.as_deref(), Some(DOC));
        assert_eq!(full.reconstruct(extract_body(DOC)), DOC);

        let fragment = WrapperState::capture("<p>x</p>");
        assert_eq!(fragment, WrapperState::default());
        assert_eq!(fragment.reconstruct("<p>y</p>"), "<p>y</p>");
    }
}
