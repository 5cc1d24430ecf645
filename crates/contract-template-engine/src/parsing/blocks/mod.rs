//! # Block Isolation
//!
//! Some structures cannot survive the editor's own content model when template
//! control markers sit between their elements: a loop marker between table
//! rows, a conditional opening a list. These are replaced wholesale by an
//! opaque wrapper that carries the original markup in a percent-encoded
//! attribute, and spliced back byte for byte on save.
//!
//! ## Modules
//!
//! - **`shape`**: `BlockShape` detection rules (table, list, signature)
//! - **`isolate`**: `isolate_blocks()` / `deisolate_blocks()`
//!
//! ## Key Invariants
//!
//! - Rules run in fixed order: table, then list, then signature
//! - A span is claimed at most once; later rules skip overlapping candidates
//! - Isolated regions are raw zones for inline tagging

pub mod isolate;
pub mod shape;

pub use isolate::{deisolate_blocks, isolate_blocks};
pub use shape::BlockShape;
