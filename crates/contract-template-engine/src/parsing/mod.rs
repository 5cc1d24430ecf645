//! # Template Markup Parsing
//!
//! String-to-string passes over stored templates. Nothing here builds a tree:
//! each pass scans the original text, collects byte spans, and splices.
//!
//! ## Modules
//!
//! - **`span`**: `Span` byte ranges shared by every pass
//! - **`markup`**: minimal HTML tag and element scanner
//! - **`shell`**: full-document detection, body extraction, reconstruction
//! - **`blocks`**: isolation of tables, lists and signature sections
//! - **`page_break`**: page break marker normalization
//! - **`inline`**: expression and block marker tagging
//!
//! ## Key Invariants
//!
//! - Unrecognised or malformed syntax is copied through verbatim
//! - Bytes outside recognised constructs are never altered

pub mod blocks;
pub mod inline;
pub mod markup;
pub mod page_break;
pub mod shell;
pub mod span;

#[cfg(test)]
mod tests;

pub use blocks::{deisolate_blocks, isolate_blocks};
pub use inline::{parse_inline, tag_inline, untag_inline};
pub use page_break::normalize_page_breaks;
pub use shell::{WrapperState, extract_body, is_full_document, reconstruct_document};
pub use span::Span;
