use crate::nodes::{AtomicNode, BLOCK_TYPE, BlockMarker, DATA_TYPE, Expression, VARIABLE_TYPE};
use crate::parsing::markup::{find_marked_elements, outermost};

use super::{parser::parse_inline, types::InlineNode};

/// Replaces every expression site and block marker with an atomic unit.
///
/// The unit's visible label is the construct's original source text. Regions
/// already claimed by the block isolator are raw zones and pass through
/// untouched, so isolation must run first.
pub fn tag_inline(fragment: &str) -> String {
    let nodes = parse_inline(fragment);
    let tagged = nodes.iter().filter(|n| n.is_construct()).count();
    if tagged == 0 {
        return fragment.to_string();
    }

    let mut out = String::with_capacity(fragment.len() + tagged * 96);
    for node in &nodes {
        match node {
            InlineNode::Text(sp) | InlineNode::RawZone(sp) => out.push_str(sp.slice(fragment)),
            InlineNode::Expression { full, name, filter } => {
                let expr = Expression::new(
                    name.slice(fragment),
                    filter.map(|f| f.slice(fragment).to_string()),
                );
                out.push_str(&expr.to_markup(Some(full.slice(fragment))));
            }
            InlineNode::BlockMarker { full, kind, clause } => {
                let marker = BlockMarker::new(*kind, clause.slice(fragment));
                out.push_str(&marker.to_markup(Some(full.slice(fragment))));
            }
        }
    }

    log::debug!("Tagged {tagged} inline constructs");
    out
}

/// Re-emits template syntax for every expression and block unit.
///
/// Syntax is rebuilt from the unit's attributes. A unit whose payload is
/// unusable falls back to its visible content. Everything outside units is
/// copied verbatim.
pub fn untag_inline(edited: &str) -> String {
    let units = outermost(find_marked_elements(edited, DATA_TYPE, &[VARIABLE_TYPE, BLOCK_TYPE]));
    if units.is_empty() {
        return edited.to_string();
    }

    let mut out = String::with_capacity(edited.len());
    let mut last = 0;
    for unit in &units {
        out.push_str(&edited[last..unit.outer.start]);
        match AtomicNode::from_tag(&unit.tag) {
            Some(AtomicNode::Expression(expr)) => out.push_str(&expr.to_template()),
            Some(AtomicNode::BlockMarker(marker)) => out.push_str(&marker.to_template()),
            _ => {
                log::warn!(
                    "Inline unit at byte {} has no usable payload, keeping its label",
                    unit.outer.start
                );
                out.push_str(unit.inner.slice(edited));
            }
        }
        last = unit.outer.end;
    }
    out.push_str(&edited[last..]);

    log::debug!("Untagged {} inline units", units.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn tags_expression_with_payload_and_label() {
        insta::assert_snapshot!(
            tag_inline("<p>{{ tenant.name }}</p>"),
            @r#"<p><span data-type="template-variable" data-name="tenant.name" contenteditable="false" class="template-variable">{{ tenant.name }}</span></p>"#
        );
    }

    #[test]
    fn tags_block_marker() {
        insta::assert_snapshot!(
            tag_inline("{% if lease.active %}"),
            @r#"<span data-type="template-block" data-kind="if" data-clause="lease.active" contenteditable="false" class="template-block template-block-if">{% if lease.active %}</span>"#
        );
    }

    #[test]
    fn untagged_text_is_unchanged() {
        let s = "<p>No constructs here &amp; none there.</p>";
        assert_eq!(tag_inline(s), s);
        assert_eq!(untag_inline(s), s);
    }

    #[rstest]
    #[case("{{ tenant.name }}")]
    #[case("{{ rental_value | currency }}")]
    #[case("<p>Dear {{ tenant.name }},</p><p>{% if x > 1 %}many{% else %}one{% endif %}</p>")]
    #[case("<ul><li>{% for a in items %}{{ a.label | upper }}{% endfor %}</li></ul>")]
    #[case(r#"<a href="{{ url }}">{{ label }}</a> {{ unclosed"#)]
    #[case("{% elif kind == \"residential\" %}")]
    fn untag_reverses_tag(#[case] fragment: &str) {
        assert_eq!(untag_inline(&tag_inline(fragment)), fragment);
    }

    #[test]
    fn untag_normalizes_spacing() {
        assert_eq!(untag_inline(&tag_inline("{{name|upper}}")), "{{ name | upper }}");
        assert_eq!(untag_inline(&tag_inline("{%if x%}")), "{% if x %}");
    }

    #[test]
    fn tagging_twice_does_not_double_wrap() {
        let once = tag_inline("<p>{{ a }}</p>");
        assert_eq!(tag_inline(&once), once);
    }

    #[test]
    fn untag_reads_attributes_in_any_order() {
        let edited = r#"<p><span class="template-variable" data-filter="date" contenteditable="false" data-name="lease.start" data-type="template-variable">whatever</span></p>"#;
        assert_eq!(untag_inline(edited), "<p>{{ lease.start | date }}</p>");
    }

    #[test]
    fn unit_without_payload_keeps_label() {
        let edited = r#"<span data-type="template-variable">{{ lost }}</span>"#;
        assert_eq!(untag_inline(edited), "{{ lost }}");
    }

    #[test]
    fn inserted_unit_with_escaped_clause() {
        let marker = BlockMarker::new(crate::nodes::BlockKind::If, r#"a < b and c == "d""#);
        let edited = format!("<p>{}</p>", marker.to_markup(None));
        assert_eq!(untag_inline(&edited), r#"<p>{% if a < b and c == "d" %}</p>"#);
    }
}
