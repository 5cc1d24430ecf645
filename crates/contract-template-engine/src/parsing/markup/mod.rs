//! # Markup Scanning
//!
//! A minimal HTML tag tokenizer. The converter never builds a DOM: every
//! transform works on the original string and only needs to know where tags,
//! comments and matching element pairs start and end.
//!
//! ## Modules
//!
//! - **`tag`**: `scan_tag()` recognises a single open/close/self-closing tag
//!   and decodes its attributes
//! - **`element`**: `find_elements_by()` pairs open tags with their matching
//!   close tag by depth counting per tag name
//!
//! ## Recognition Rules
//!
//! - `<` starts a tag only when followed by an ASCII letter or `/` + letter,
//!   so `a < b` in body text stays text
//! - `<!-- ... -->` comments and `<!...>` declarations are opaque
//! - Unterminated tags and elements without a matching close are not reported

pub mod element;
pub mod tag;

pub use element::{Element, find_elements, find_elements_by, find_marked_elements, outermost};
pub use tag::{Tag, TagKind, scan_declaration, scan_tag};
