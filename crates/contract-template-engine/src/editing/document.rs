use std::ops::Range;

use xi_rope::{Rope, delta::DeltaElement};

use crate::editing::{Cmd, CommandError, Patch, commands::compile_command};
use crate::nodes::PAGE_BREAK_CLASS;

/// The editable fragment as held by the rich-text engine.
///
/// ## Single Source of Truth
/// - The whole fragment lives in one `xi_rope::Rope` buffer
/// - `text()` returns the buffer verbatim; nothing is regenerated from a model
///
/// ## Command-Based Editing
/// - Every change is a [`Cmd`] compiled to a `Delta` and applied immediately
/// - The selection is carried through each edit
/// - `version` increments once per applied command
#[derive(Clone)]
pub struct Document {
    /// xi-rope buffer containing the editable fragment
    pub(crate) buffer: Rope,
    /// Current selection/cursor position as byte offsets in buffer
    pub(crate) selection: Range<usize>,
    /// Version counter incremented on each edit
    pub(crate) version: u64,
    /// Class written by `Cmd::InsertPageBreak`
    pub(crate) page_break_class: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl Document {
    /// Create a document with the cursor at the end
    pub fn new(text: &str) -> Self {
        let buffer = Rope::from(text);
        let len = buffer.len();
        Self {
            buffer,
            selection: len..len,
            version: 0,
            page_break_class: PAGE_BREAK_CLASS.to_string(),
        }
    }

    /// Create a new document from raw bytes
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self::new(text))
    }

    pub fn with_page_break_class(mut self, class: impl Into<String>) -> Self {
        self.page_break_class = class.into();
        self
    }

    /// Get the document's content as raw bytes (exact round-trip)
    pub fn to_bytes(&self) -> Vec<u8> {
        self.buffer.to_string().into_bytes()
    }

    /// Apply a command to the document.
    ///
    /// The command is compiled to a `Delta` against the current buffer, the
    /// delta is applied, the selection moves to where the command puts it and
    /// the version increments. A rejected command leaves the document as it
    /// was.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Patch, CommandError> {
        let edit = compile_command(self, &cmd)?;

        // Track changed ranges for the patch
        let mut changed = Vec::new();
        let mut cursor = 0;
        for op in edit.delta.els.iter() {
            match op {
                DeltaElement::Copy(_from, to) => {
                    cursor = *to;
                }
                DeltaElement::Insert(inserted) => {
                    let start = cursor;
                    let end = cursor + inserted.len();
                    changed.push(start..end);
                    cursor = end;
                }
            }
        }

        self.buffer = edit.delta.apply(&self.buffer);
        self.selection = edit.selection.clone();
        self.version += 1;

        log::debug!(
            "Applied command -> version {}, changed {:?}",
            self.version,
            changed
        );

        Ok(Patch {
            changed,
            new_selection: edit.selection,
            version: self.version,
        })
    }

    /// Get the current selection range
    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    /// Set the selection range, clamped to the buffer
    pub fn set_selection(&mut self, selection: Range<usize>) {
        let len = self.len();
        let start = selection.start.min(len);
        let end = selection.end.clamp(start, len);
        self.selection = start..end;
    }

    /// Get the current version
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get the current text content
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn page_break_class(&self) -> &str {
        &self.page_break_class
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("text", &self.text())
            .field("selection", &self.selection)
            .field("version", &self.version)
            .finish()
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.text() == other.text()
            && self.selection == other.selection
            && self.version == other.version
    }
}
