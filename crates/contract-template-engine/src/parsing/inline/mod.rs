//! # Inline Constructs
//!
//! Cursor-based scanning of single-expression constructs, and the tag/untag
//! transforms built on it.
//!
//! ## Modules
//!
//! - **`types`**: `InlineNode` enum (Text, Expression, BlockMarker, RawZone)
//! - **`cursor`**: `Cursor` for byte-by-byte scanning with position tracking
//! - **`parser`**: `parse_inline()` main entry point with `try_parse_*` helpers
//! - **`render`**: `tag_inline()` / `untag_inline()`
//!
//! ## Raw Zone Precedence
//!
//! Atomic units already in the fragment (isolated blocks in particular) are
//! raw zones: nothing inside them is scanned. Tags and comments are skipped
//! whole. Malformed syntax is never an error; it is simply not matched and
//! stays literal text in both directions.

pub mod cursor;
pub mod parser;
pub mod render;
pub mod types;

pub use parser::{contains_block_marker, parse_inline, starts_with_block_marker};
pub use render::{tag_inline, untag_inline};
pub use types::InlineNode;
