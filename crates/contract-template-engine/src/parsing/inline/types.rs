use crate::nodes::BlockKind;
use crate::parsing::span::Span;

/// A scanned inline node with byte spans into the fragment.
///
/// Variants store spans rather than text; rendering slices the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineNode {
    /// Anything that isn't a templating construct, tags included.
    Text(Span),
    /// `{{ name }}` or `{{ name | filter }}`.
    Expression {
        /// Full span including `{{` and `}}`.
        full: Span,
        /// The trimmed name.
        name: Span,
        /// The trimmed filter identifier, if present.
        filter: Option<Span>,
    },
    /// `{% kind clause %}`.
    BlockMarker {
        /// Full span including `{%` and `%}`.
        full: Span,
        kind: BlockKind,
        /// The trimmed clause. Empty when the marker has none.
        clause: Span,
    },
    /// An existing atomic unit (isolated block or already tagged construct).
    /// Nothing inside is scanned.
    RawZone(Span),
}

impl InlineNode {
    /// The full span covered by the node.
    pub fn span(&self) -> Span {
        match self {
            InlineNode::Text(sp) | InlineNode::RawZone(sp) => *sp,
            InlineNode::Expression { full, .. } | InlineNode::BlockMarker { full, .. } => *full,
        }
    }

    pub fn is_construct(&self) -> bool {
        matches!(
            self,
            InlineNode::Expression { .. } | InlineNode::BlockMarker { .. }
        )
    }
}
