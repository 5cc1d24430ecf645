/// A byte cursor over a markup fragment.
///
/// Constructs are only ever split at ASCII delimiters (`{`, `<`), so byte
/// positions taken from the cursor are always valid `str` boundaries when used
/// as span ends.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s
            .as_bytes()
            .get(self.i..)
            .is_some_and(|rest| rest.starts_with(pat))
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Moves to an absolute position at or after the current one.
    pub fn jump_to(&mut self, pos: usize) {
        debug_assert!(pos >= self.i, "cursor cannot move backwards");
        self.i = pos;
    }
}
