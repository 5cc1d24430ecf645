use crate::convert::Options;
use crate::nodes::RawBlockKind;
use crate::parsing::inline::{contains_block_marker, starts_with_block_marker};
use crate::parsing::markup::{Element, find_elements, find_elements_by};

/// A structural shape that must be isolated as one opaque unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockShape {
    /// A `<table>` with a block marker anywhere inside it.
    Table,
    /// A `<ul>`/`<ol>` whose content opens with a block marker.
    List,
    /// The fixed-class signature container.
    Signature,
}

impl BlockShape {
    /// Detection order. A span claimed by an earlier shape is never matched
    /// again by a later one, though a later element enclosing it may absorb it.
    pub const PRIORITY: [BlockShape; 3] =
        [BlockShape::Table, BlockShape::List, BlockShape::Signature];

    pub fn kind(self) -> RawBlockKind {
        match self {
            BlockShape::Table => RawBlockKind::Table,
            BlockShape::List => RawBlockKind::List,
            BlockShape::Signature => RawBlockKind::Signature,
        }
    }

    /// Every element of this shape in document order, nested ones included.
    pub fn candidates(self, fragment: &str, options: &Options) -> Vec<Element> {
        match self {
            BlockShape::Table => find_elements(fragment, "table"),
            BlockShape::List => {
                find_elements_by(fragment, |tag| tag.name == "ul" || tag.name == "ol")
            }
            BlockShape::Signature => {
                find_elements_by(fragment, |tag| tag.has_class(&options.signature_class))
            }
        }
    }

    /// Whether a candidate element actually needs isolating.
    pub fn qualifies(self, fragment: &str, element: &Element) -> bool {
        let inner = element.inner.slice(fragment);
        match self {
            BlockShape::Table => contains_block_marker(inner),
            BlockShape::List => starts_with_block_marker(inner),
            BlockShape::Signature => true,
        }
    }
}
