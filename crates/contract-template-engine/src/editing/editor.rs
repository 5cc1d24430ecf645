use std::ops::Range;

use crate::convert::Converter;
use crate::editing::{Cmd, CommandError, Document};
use crate::nodes::BlockKind;
use crate::parsing::WrapperState;

/// One editing session over a stored template.
///
/// Sits between the host (which owns the stored value) and the [`Document`]
/// (which owns the editable fragment). External values come in through
/// [`TemplateEditor::set_value`]; every applied command produces the new
/// stored value for the host to persist.
///
/// Two guards keep the host and the editor from feeding each other:
/// - a value equal to the last one this session emitted is not reloaded
/// - while a loaded value is being written into the document, the update
///   callback emits nothing
#[derive(Debug, Clone)]
pub struct TemplateEditor {
    converter: Converter,
    document: Document,
    wrapper: WrapperState,
    last_emitted: Option<String>,
    programmatic_update: bool,
}

impl Default for TemplateEditor {
    fn default() -> Self {
        Self::new(Converter::default())
    }
}

impl TemplateEditor {
    pub fn new(converter: Converter) -> Self {
        let document =
            Document::default().with_page_break_class(&converter.options().page_break_class);
        Self {
            converter,
            document,
            wrapper: WrapperState::default(),
            last_emitted: None,
            programmatic_update: false,
        }
    }

    /// Loads an external stored value into the editor.
    ///
    /// Returns `false` without touching the document when `stored` is what
    /// this session last emitted.
    pub fn set_value(&mut self, stored: &str) -> Result<bool, CommandError> {
        if self.last_emitted.as_deref() == Some(stored) {
            log::debug!("Incoming value matches last emitted value, not reloading");
            return Ok(false);
        }

        self.wrapper = WrapperState::capture(stored);
        let editable = self.converter.to_editable(stored);

        self.programmatic_update = true;
        let applied = self.document.apply(Cmd::ReplaceAll { text: editable });
        let emitted = self.on_update();
        self.programmatic_update = false;
        applied?;
        debug_assert!(emitted.is_none());

        self.last_emitted = Some(stored.to_string());
        log::debug!(
            "Loaded {} value ({} bytes)",
            if self.wrapper.is_full_document { "full document" } else { "fragment" },
            stored.len()
        );
        Ok(true)
    }

    /// Applies a command and returns the resulting stored value.
    pub fn apply(&mut self, cmd: Cmd) -> Result<Option<String>, CommandError> {
        self.document.apply(cmd)?;
        Ok(self.on_update())
    }

    /// The update callback run after every document mutation.
    ///
    /// Emits the new stored value, or `None` while a programmatic update is in
    /// progress.
    pub fn on_update(&mut self) -> Option<String> {
        if self.programmatic_update {
            return None;
        }
        let stored = self.value();
        self.last_emitted = Some(stored.clone());
        Some(stored)
    }

    /// The current stored value.
    pub fn value(&self) -> String {
        self.converter.to_stored(&self.document.text(), &self.wrapper)
    }

    /// The fragment currently handed to the rich-text engine.
    pub fn editable(&self) -> String {
        self.document.text()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn wrapper(&self) -> &WrapperState {
        &self.wrapper
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    pub fn last_emitted(&self) -> Option<&str> {
        self.last_emitted.as_deref()
    }

    pub fn set_selection(&mut self, selection: Range<usize>) {
        self.document.set_selection(selection);
    }

    pub fn insert_expression(
        &mut self,
        name: &str,
        filter: Option<&str>,
    ) -> Result<Option<String>, CommandError> {
        self.apply(Cmd::InsertExpression {
            name: name.to_string(),
            filter: filter.map(String::from),
        })
    }

    pub fn insert_block_marker(
        &mut self,
        kind: BlockKind,
        clause: &str,
    ) -> Result<Option<String>, CommandError> {
        self.apply(Cmd::InsertBlockMarker {
            kind,
            clause: clause.to_string(),
        })
    }

    pub fn insert_page_break(&mut self) -> Result<Option<String>, CommandError> {
        self.apply(Cmd::InsertPageBreak)
    }
}
