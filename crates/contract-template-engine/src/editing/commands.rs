use std::ops::Range;

use xi_rope::delta::Builder;
use xi_rope::{Delta, Rope, RopeInfo};

use crate::editing::Document;
use crate::nodes::{AtomicNode, BlockKind, BlockMarker, Expression, PageBreak};
use crate::parsing::markup::{find_elements_by, outermost, scan_declaration, scan_tag};

/// Commands that can be applied to the document
#[derive(Debug, Clone, PartialEq)]
pub enum Cmd {
    InsertText {
        at: usize,
        text: String,
    },
    DeleteRange {
        range: Range<usize>,
    },
    ReplaceRange {
        range: Range<usize>,
        text: String,
    },
    /// Replaces the whole buffer. Used when an external value is loaded.
    ReplaceAll {
        text: String,
    },
    InsertExpression {
        name: String,
        filter: Option<String>,
    },
    InsertBlockMarker {
        kind: BlockKind,
        clause: String,
    },
    InsertPageBreak,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Range {start}..{end} is outside the document (length {len})")]
    OutOfBounds { start: usize, end: usize, len: usize },
    #[error("Offset {0} is not on a character boundary")]
    NotCharBoundary(usize),
    #[error("Invalid expression name: {0:?}")]
    InvalidName(String),
    #[error("Invalid filter: {0:?}, expected a single identifier")]
    InvalidFilter(String),
    #[error("`{0}` needs a clause")]
    MissingClause(BlockKind),
    #[error("`{0}` does not take a clause")]
    UnexpectedClause(BlockKind),
    #[error("Clause must not contain the closing delimiter: {0:?}")]
    InvalidClause(String),
}

/// A compiled command: the delta plus where the selection ends up.
pub(crate) struct Edit {
    pub(crate) delta: Delta<RopeInfo>,
    pub(crate) selection: Range<usize>,
}

/// Compile a command into a delta
pub(crate) fn compile_command(doc: &Document, cmd: &Cmd) -> Result<Edit, CommandError> {
    let text = doc.text();
    match cmd {
        Cmd::InsertText { at, text: inserted } => {
            check_range(&text, *at..*at)?;
            Ok(replace(doc, *at..*at, inserted))
        }
        Cmd::DeleteRange { range } => {
            check_range(&text, range.clone())?;
            Ok(replace(doc, range.clone(), ""))
        }
        Cmd::ReplaceRange {
            range,
            text: inserted,
        } => {
            check_range(&text, range.clone())?;
            Ok(replace(doc, range.clone(), inserted))
        }
        Cmd::ReplaceAll { text: inserted } => {
            let mut builder = Builder::new(doc.len());
            builder.replace(0..doc.len(), Rope::from(inserted.as_str()));
            Ok(Edit {
                delta: builder.build(),
                selection: inserted.len()..inserted.len(),
            })
        }
        Cmd::InsertExpression { name, filter } => {
            let markup = expression_markup(name, filter.as_deref())?;
            Ok(insert_unit(doc, &text, &markup))
        }
        Cmd::InsertBlockMarker { kind, clause } => {
            let markup = block_marker_markup(*kind, clause)?;
            Ok(insert_unit(doc, &text, &markup))
        }
        Cmd::InsertPageBreak => {
            let markup = PageBreak::to_markup(doc.page_break_class());
            Ok(insert_unit(doc, &text, &markup))
        }
    }
}

fn check_range(text: &str, range: Range<usize>) -> Result<(), CommandError> {
    if range.start > range.end || range.end > text.len() {
        return Err(CommandError::OutOfBounds {
            start: range.start,
            end: range.end,
            len: text.len(),
        });
    }
    for at in [range.start, range.end] {
        if !text.is_char_boundary(at) {
            return Err(CommandError::NotCharBoundary(at));
        }
    }
    Ok(())
}

fn replace(doc: &Document, range: Range<usize>, inserted: &str) -> Edit {
    let selection = transform_selection(&doc.selection(), &range, inserted.len());
    let mut builder = Builder::new(doc.len());
    if range.is_empty() {
        builder.replace(range, Rope::from(inserted));
    } else if inserted.is_empty() {
        builder.delete(range);
    } else {
        builder.replace(range, Rope::from(inserted));
    }
    Edit {
        delta: builder.build(),
        selection,
    }
}

fn expression_markup(name: &str, filter: Option<&str>) -> Result<String, CommandError> {
    let filter = filter.map(str::trim).filter(|f| !f.is_empty());
    let expr = Expression::new(name.trim(), filter.map(String::from));
    if expr.is_valid() {
        return Ok(expr.to_markup(None));
    }
    Err(match expr.filter {
        Some(filter) if crate::nodes::is_valid_name(&expr.name) => {
            CommandError::InvalidFilter(filter)
        }
        _ => CommandError::InvalidName(expr.name),
    })
}

fn block_marker_markup(kind: BlockKind, clause: &str) -> Result<String, CommandError> {
    let clause = clause.trim();
    if clause.contains("%}") {
        return Err(CommandError::InvalidClause(clause.to_string()));
    }
    match (kind.takes_clause(), clause.is_empty()) {
        (true, true) => Err(CommandError::MissingClause(kind)),
        (false, false) => Err(CommandError::UnexpectedClause(kind)),
        _ => Ok(BlockMarker::new(kind, clause).to_markup(None)),
    }
}

/// Inserts an atomic unit at the selection, replacing it when non-empty, and
/// leaves the cursor after the unit.
fn insert_unit(doc: &Document, text: &str, markup: &str) -> Edit {
    let selection = doc.selection();
    let start = insertion_point(text, selection.start);
    let end = insertion_point(text, selection.end).max(start);

    let mut builder = Builder::new(doc.len());
    builder.replace(start..end, Rope::from(markup));
    let cursor = start + markup.len();
    Edit {
        delta: builder.build(),
        selection: cursor..cursor,
    }
}

/// Moves `at` out of any tag, comment or atomic unit it falls inside, and onto
/// a character boundary.
pub(crate) fn insertion_point(text: &str, at: usize) -> usize {
    let mut at = at.min(text.len());

    for unit in outermost(find_elements_by(text, AtomicNode::is_marked)) {
        if unit.outer.start < at && at < unit.outer.end {
            at = unit.outer.end;
            break;
        }
    }

    if let Some(lt) = text[..floor_char_boundary(text, at)].rfind('<') {
        let end = scan_declaration(text, lt)
            .map(|d| d.end)
            .or_else(|| scan_tag(text, lt).map(|t| t.span.end));
        if let Some(end) = end
            && end > at
        {
            at = end;
        }
    }

    while !text.is_char_boundary(at) {
        at += 1;
    }
    at
}

fn floor_char_boundary(text: &str, mut at: usize) -> usize {
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}

/// Transform selection through replacing `replaced` with `inserted` bytes
pub(crate) fn transform_selection(
    selection: &Range<usize>,
    replaced: &Range<usize>,
    inserted: usize,
) -> Range<usize> {
    if replaced.is_empty() {
        let at = replaced.start;
        // If insertion point is before or at selection start, shift selection right
        if at <= selection.start {
            (selection.start + inserted)..(selection.end + inserted)
        } else if at < selection.end {
            // Insertion is within selection - grow the end
            selection.start..(selection.end + inserted)
        } else {
            selection.clone()
        }
    } else if replaced.end <= selection.start {
        // Replacement is before selection - shift by net change
        let shift = |p: usize| p - replaced.len() + inserted;
        shift(selection.start)..shift(selection.end)
    } else if replaced.start >= selection.end {
        selection.clone()
    } else {
        // Overlaps the selection - collapse after the replacement
        let point = replaced.start + inserted;
        point..point
    }
}
