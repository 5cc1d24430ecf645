//! # Atomic Nodes
//!
//! Payload types for the non-editable units the rich-text engine hosts, and
//! their serialization to and from the engine's markup.
//!
//! Every unit is an element carrying a `data-type` discriminator,
//! `contenteditable="false"`, its payload as `data-*` attributes and a visible
//! label. The label is never read back: reverse mapping rebuilds the template
//! syntax from the attributes alone.
//!
//! | Unit | Element | Payload attributes |
//! |------|---------|--------------------|
//! | `Expression` | `span[data-type="template-variable"]` | `data-name`, `data-filter` |
//! | `BlockMarker` | `span[data-type="template-block"]` | `data-kind`, `data-clause` |
//! | `RawBlock` | `div[data-type="raw-block"]` | `data-raw-kind`, `data-raw-html` (percent-encoded) |
//! | `PageBreak` | `div.page-break` | none |

pub mod schema;

use std::fmt;
use std::str::FromStr;

use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::{Deserialize, Serialize};

use crate::parsing::markup::Tag;

pub use schema::{AttrSpec, NodeDescriptor, NodeGroup, NodeSpec, schema};

pub const DATA_TYPE: &str = "data-type";
pub const DATA_NAME: &str = "data-name";
pub const DATA_FILTER: &str = "data-filter";
pub const DATA_KIND: &str = "data-kind";
pub const DATA_CLAUSE: &str = "data-clause";
pub const DATA_RAW_KIND: &str = "data-raw-kind";
pub const DATA_RAW_HTML: &str = "data-raw-html";

pub const VARIABLE_TYPE: &str = "template-variable";
pub const BLOCK_TYPE: &str = "template-block";
pub const RAW_BLOCK_TYPE: &str = "raw-block";

/// Default class of the page break marker element.
pub const PAGE_BREAK_CLASS: &str = "page-break";

/// An interpolation site: `{{ name }}` or `{{ name | filter }}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub name: String,
    pub filter: Option<String>,
}

impl Expression {
    pub const OPEN: &'static [u8; 2] = b"{{";
    pub const CLOSE: &'static [u8; 2] = b"}}";
    pub const PIPE: u8 = b'|';

    pub fn new(name: impl Into<String>, filter: Option<String>) -> Self {
        Self {
            name: name.into(),
            filter,
        }
    }

    /// True when the name is non-empty and free of delimiter characters, and
    /// the filter (if any) is a single identifier.
    pub fn is_valid(&self) -> bool {
        is_valid_name(&self.name) && self.filter.as_deref().is_none_or(is_identifier)
    }

    pub fn to_template(&self) -> String {
        match &self.filter {
            Some(filter) => format!("{{{{ {} | {} }}}}", self.name, filter),
            None => format!("{{{{ {} }}}}", self.name),
        }
    }

    /// Renders the editable unit. `label` is HTML to show inside the unit; the
    /// escaped template syntax is used when `None`.
    pub fn to_markup(&self, label: Option<&str>) -> String {
        let label = label_or_default(label, &self.to_template());
        let mut out = format!(
            r#"<span {DATA_TYPE}="{VARIABLE_TYPE}" {DATA_NAME}="{}""#,
            encode_double_quoted_attribute(&self.name)
        );
        if let Some(filter) = &self.filter {
            out.push_str(&format!(
                r#" {DATA_FILTER}="{}""#,
                encode_double_quoted_attribute(filter)
            ));
        }
        out.push_str(&format!(
            r#" contenteditable="false" class="{VARIABLE_TYPE}">{label}</span>"#
        ));
        out
    }

    pub fn from_tag(tag: &Tag) -> Option<Self> {
        if tag.attr(DATA_TYPE) != Some(VARIABLE_TYPE) {
            return None;
        }
        let name = tag.non_empty_attr(DATA_NAME)?;
        Some(Self {
            name: name.to_string(),
            filter: tag.non_empty_attr(DATA_FILTER).map(str::to_string),
        })
    }
}

/// The control-flow keywords a block marker may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    If,
    For,
    Endif,
    Endfor,
    Else,
    Elif,
}

impl BlockKind {
    pub const ALL: [BlockKind; 6] = [
        BlockKind::If,
        BlockKind::For,
        BlockKind::Endif,
        BlockKind::Endfor,
        BlockKind::Else,
        BlockKind::Elif,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::For => "for",
            BlockKind::Endif => "endif",
            BlockKind::Endfor => "endfor",
            BlockKind::Else => "else",
            BlockKind::Elif => "elif",
        }
    }

    /// Whether this kind carries a condition or iteration clause.
    pub fn takes_clause(self) -> bool {
        matches!(self, BlockKind::If | BlockKind::For | BlockKind::Elif)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown block kind: {0}")]
pub struct UnknownBlockKind(pub String);

impl FromStr for BlockKind {
    type Err = UnknownBlockKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownBlockKind(s.to_string()))
    }
}

/// A control-flow delimiter: `{% kind clause %}` or `{% kind %}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockMarker {
    pub kind: BlockKind,
    pub clause: String,
}

impl BlockMarker {
    pub const OPEN: &'static [u8; 2] = b"{%";
    pub const CLOSE: &'static [u8; 2] = b"%}";

    pub fn new(kind: BlockKind, clause: impl Into<String>) -> Self {
        Self {
            kind,
            clause: clause.into(),
        }
    }

    pub fn to_template(&self) -> String {
        if self.clause.is_empty() {
            format!("{{% {} %}}", self.kind)
        } else {
            format!("{{% {} {} %}}", self.kind, self.clause)
        }
    }

    pub fn to_markup(&self, label: Option<&str>) -> String {
        let label = label_or_default(label, &self.to_template());
        let mut out = format!(
            r#"<span {DATA_TYPE}="{BLOCK_TYPE}" {DATA_KIND}="{}""#,
            self.kind
        );
        if !self.clause.is_empty() {
            out.push_str(&format!(
                r#" {DATA_CLAUSE}="{}""#,
                encode_double_quoted_attribute(&self.clause)
            ));
        }
        out.push_str(&format!(
            r#" contenteditable="false" class="{BLOCK_TYPE} {BLOCK_TYPE}-{}">{label}</span>"#,
            self.kind
        ));
        out
    }

    pub fn from_tag(tag: &Tag) -> Option<Self> {
        if tag.attr(DATA_TYPE) != Some(BLOCK_TYPE) {
            return None;
        }
        let kind = tag.attr(DATA_KIND)?.parse().ok()?;
        Some(Self {
            kind,
            clause: tag.attr(DATA_CLAUSE).unwrap_or_default().to_string(),
        })
    }
}

/// The structural shape an isolated block was detected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawBlockKind {
    Table,
    List,
    Signature,
}

impl RawBlockKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RawBlockKind::Table => "table",
            RawBlockKind::List => "list",
            RawBlockKind::Signature => "signature",
        }
    }
}

impl FromStr for RawBlockKind {
    type Err = UnknownBlockKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(RawBlockKind::Table),
            "list" => Ok(RawBlockKind::List),
            "signature" => Ok(RawBlockKind::Signature),
            other => Err(UnknownBlockKind(other.to_string())),
        }
    }
}

/// A span of original markup carried verbatim through the edit cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    pub kind: RawBlockKind,
    pub original_markup: String,
}

impl RawBlock {
    pub fn new(kind: RawBlockKind, original_markup: impl Into<String>) -> Self {
        Self {
            kind,
            original_markup: original_markup.into(),
        }
    }

    /// Renders the opaque wrapper. The percent-encoded payload contains no
    /// quotes, angle brackets or ampersands, so it needs no attribute escaping.
    pub fn to_markup(&self, label: &str) -> String {
        format!(
            r#"<div {DATA_TYPE}="{RAW_BLOCK_TYPE}" {DATA_RAW_KIND}="{}" {DATA_RAW_HTML}="{}" contenteditable="false" class="{RAW_BLOCK_TYPE}">{}</div>"#,
            self.kind.as_str(),
            urlencoding::encode(&self.original_markup),
            encode_text(label)
        )
    }

    /// Rebuilds the block from its wrapper tag. `None` when the payload is
    /// missing or does not decode to UTF-8.
    pub fn from_tag(tag: &Tag) -> Option<Self> {
        if tag.attr(DATA_TYPE) != Some(RAW_BLOCK_TYPE) {
            return None;
        }
        let encoded = tag.attr(DATA_RAW_HTML)?;
        let original_markup = match urlencoding::decode(encoded) {
            Ok(decoded) => decoded.into_owned(),
            Err(e) => {
                log::warn!("Raw block payload is not valid UTF-8: {e}");
                return None;
            }
        };
        let kind = tag
            .attr(DATA_RAW_KIND)
            .and_then(|k| k.parse().ok())
            .unwrap_or(RawBlockKind::Table);
        Some(Self {
            kind,
            original_markup,
        })
    }
}

/// The page break marker element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageBreak;

impl PageBreak {
    pub fn to_markup(class: &str) -> String {
        format!(r#"<div class="{}"></div>"#, encode_double_quoted_attribute(class))
    }
}

/// Any atomic unit, dispatched on the `data-type` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtomicNode {
    Expression(Expression),
    BlockMarker(BlockMarker),
    RawBlock(RawBlock),
}

impl AtomicNode {
    /// The `data-type` values that mark an element as an atomic unit.
    pub const DATA_TYPES: [&'static str; 3] = [VARIABLE_TYPE, BLOCK_TYPE, RAW_BLOCK_TYPE];

    /// True when the tag opens an atomic unit, whether or not its payload is
    /// intact.
    pub fn is_marked(tag: &Tag) -> bool {
        tag.attr(DATA_TYPE)
            .is_some_and(|t| Self::DATA_TYPES.contains(&t))
    }

    pub fn from_tag(tag: &Tag) -> Option<Self> {
        match tag.attr(DATA_TYPE)? {
            VARIABLE_TYPE => Expression::from_tag(tag).map(AtomicNode::Expression),
            BLOCK_TYPE => BlockMarker::from_tag(tag).map(AtomicNode::BlockMarker),
            RAW_BLOCK_TYPE => RawBlock::from_tag(tag).map(AtomicNode::RawBlock),
            _ => None,
        }
    }
}

fn label_or_default(label: Option<&str>, template: &str) -> String {
    match label {
        Some(label) => label.to_string(),
        None => encode_text(template).into_owned(),
    }
}

/// A non-empty name with no delimiter characters in it.
pub fn is_valid_name(name: &str) -> bool {
    !name.trim().is_empty() && !name.contains(['{', '}', '|'])
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
