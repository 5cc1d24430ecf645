use std::ops::Range;

/// Result of applying a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Byte ranges of the new buffer holding inserted text
    pub changed: Vec<Range<usize>>,
    pub new_selection: Range<usize>,
    pub version: u64,
}
