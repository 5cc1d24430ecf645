use std::collections::BTreeMap;

use serde::Serialize;

use crate::parsing::inline::{InlineNode, parse_inline};

use super::{
    AtomicNode, BLOCK_TYPE, BlockMarker, DATA_CLAUSE, DATA_FILTER, DATA_KIND, DATA_NAME,
    DATA_RAW_HTML, DATA_RAW_KIND, DATA_TYPE, Expression, RAW_BLOCK_TYPE, VARIABLE_TYPE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeGroup {
    Inline,
    Block,
}

/// One node attribute and the HTML attribute it is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttrSpec {
    pub name: &'static str,
    pub html_attribute: &'static str,
    pub default: Option<&'static str>,
}

/// How the host editor should declare one atomic node type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSpec {
    pub name: &'static str,
    pub group: NodeGroup,
    pub atom: bool,
    pub selectable: bool,
    pub draggable: bool,
    pub tag: &'static str,
    /// CSS-style selector the host uses to recognise the node when parsing.
    pub parse_rule: String,
    pub attributes: Vec<AttrSpec>,
}

/// Node definitions for the host editor, in a stable order.
pub fn schema(page_break_class: &str) -> Vec<NodeSpec> {
    vec![
        NodeSpec {
            name: "templateVariable",
            group: NodeGroup::Inline,
            atom: true,
            selectable: true,
            draggable: true,
            tag: "span",
            parse_rule: format!(r#"span[{DATA_TYPE}="{VARIABLE_TYPE}"]"#),
            attributes: vec![
                AttrSpec {
                    name: "name",
                    html_attribute: DATA_NAME,
                    default: None,
                },
                AttrSpec {
                    name: "filter",
                    html_attribute: DATA_FILTER,
                    default: None,
                },
            ],
        },
        NodeSpec {
            name: "templateBlock",
            group: NodeGroup::Inline,
            atom: true,
            selectable: true,
            draggable: true,
            tag: "span",
            parse_rule: format!(r#"span[{DATA_TYPE}="{BLOCK_TYPE}"]"#),
            attributes: vec![
                AttrSpec {
                    name: "kind",
                    html_attribute: DATA_KIND,
                    default: Some("if"),
                },
                AttrSpec {
                    name: "clause",
                    html_attribute: DATA_CLAUSE,
                    default: Some(""),
                },
            ],
        },
        NodeSpec {
            name: "rawHtmlBlock",
            group: NodeGroup::Block,
            atom: true,
            selectable: true,
            draggable: false,
            tag: "div",
            parse_rule: format!(r#"div[{DATA_TYPE}="{RAW_BLOCK_TYPE}"]"#),
            attributes: vec![
                AttrSpec {
                    name: "kind",
                    html_attribute: DATA_RAW_KIND,
                    default: Some("table"),
                },
                AttrSpec {
                    name: "html",
                    html_attribute: DATA_RAW_HTML,
                    default: Some(""),
                },
            ],
        },
        NodeSpec {
            name: "pageBreak",
            group: NodeGroup::Block,
            atom: true,
            selectable: true,
            draggable: false,
            tag: "div",
            parse_rule: format!("div.{page_break_class}"),
            attributes: vec![],
        },
    ]
}

/// A node instance in the host editor's JSON document form
/// (`{"type": ..., "attrs": {...}}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDescriptor {
    #[serde(rename = "type")]
    pub node_type: &'static str,
    pub attrs: BTreeMap<&'static str, Option<String>>,
}

impl NodeDescriptor {
    pub fn page_break() -> Self {
        Self {
            node_type: "pageBreak",
            attrs: BTreeMap::new(),
        }
    }

    /// Describes one construct written in template syntax, e.g.
    /// `{{ rental_value | currency }}`. `None` unless the whole input is a
    /// single well-formed construct.
    pub fn from_template(construct: &str) -> Option<Self> {
        let s = construct.trim();
        let nodes = parse_inline(s);
        let [node] = nodes.as_slice() else {
            return None;
        };
        let atomic = match node {
            InlineNode::Expression { name, filter, .. } => AtomicNode::Expression(Expression::new(
                name.slice(s),
                filter.map(|f| f.slice(s).to_string()),
            )),
            InlineNode::BlockMarker { kind, clause, .. } => {
                AtomicNode::BlockMarker(BlockMarker::new(*kind, clause.slice(s)))
            }
            InlineNode::Text(_) | InlineNode::RawZone(_) => return None,
        };
        Some(Self::from(&atomic))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<&AtomicNode> for NodeDescriptor {
    fn from(node: &AtomicNode) -> Self {
        let mut attrs = BTreeMap::new();
        let node_type = match node {
            AtomicNode::Expression(expr) => {
                attrs.insert("name", Some(expr.name.clone()));
                attrs.insert("filter", expr.filter.clone());
                "templateVariable"
            }
            AtomicNode::BlockMarker(marker) => {
                attrs.insert("kind", Some(marker.kind.to_string()));
                attrs.insert("clause", Some(marker.clause.clone()));
                "templateBlock"
            }
            AtomicNode::RawBlock(block) => {
                attrs.insert("kind", Some(block.kind.as_str().to_string()));
                attrs.insert(
                    "html",
                    Some(urlencoding::encode(&block.original_markup).into_owned()),
                );
                "rawHtmlBlock"
            }
        };
        Self { node_type, attrs }
    }
}
