pub mod convert;
pub mod editing;
pub mod io;
pub mod models;
pub mod nodes;
pub mod parsing;
pub mod roundtrip;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::{Converter, Labels, Options, to_editable, to_stored};
pub use editing::{Cmd, CommandError, Document, Patch, TemplateEditor};
pub use io::*;
pub use models::TemplateFile;
pub use nodes::{BlockKind, BlockMarker, Expression, NodeDescriptor, RawBlock, RawBlockKind};
pub use parsing::WrapperState;
pub use roundtrip::{RoundTrip, check_round_trip};
