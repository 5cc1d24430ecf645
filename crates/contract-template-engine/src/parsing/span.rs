/// A byte range `[start, end)` into a markup string.
///
/// Parsed nodes store spans rather than copied text, so slicing the source
/// with any span reproduces the exact bytes that were scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    /// Inclusive start byte offset.
    pub start: usize,
    /// Exclusive end byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length in bytes. Uses saturating subtraction for safety.
    #[must_use]
    pub fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns true if the span is empty (start >= end).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.len() == 0
    }

    /// Slices `s` with this span.
    pub fn slice(self, s: &str) -> &str {
        &s[self.start..self.end]
    }

    /// True if the two spans share at least one byte.
    #[must_use]
    pub fn overlaps(self, other: Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True if `other` lies entirely within this span.
    #[must_use]
    pub fn contains(self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if `other` lies within this span and is not the same span.
    #[must_use]
    pub fn strictly_contains(self, other: Span) -> bool {
        self.contains(other) && self != other
    }
}

impl From<Span> for std::ops::Range<usize> {
    fn from(sp: Span) -> Self {
        sp.start..sp.end
    }
}
