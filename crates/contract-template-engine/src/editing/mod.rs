/*!
 * # Editing Session
 *
 * The editable fragment is held in an xi-rope buffer and changed only through
 * commands, mirroring how the host rich-text engine feeds edits.
 *
 * ## Module Structure
 *
 * - **`document`**: `Document` with the xi-rope buffer, selection and version
 * - **`commands`**: `Cmd` enum, delta compilation and insertion-point rules
 * - **`patch`**: Edit result metadata including changed ranges and new selection
 * - **`editor`**: `TemplateEditor`, the load/save loop around a `Document`
 *
 * ## Usage Pattern
 *
 * ```rust
 * use contract_template_engine::editing::*;
 *
 * let mut editor = TemplateEditor::default();
 * editor.set_value("<p>Dear </p>").unwrap();
 *
 * editor.set_selection(8..8);
 * let stored = editor.insert_expression("tenant.name", None).unwrap();
 * assert_eq!(stored.as_deref(), Some("<p>Dear {{ tenant.name }}</p>"));
 * ```
 */

pub mod commands;
pub mod document;
pub mod editor;
pub mod patch;

pub use commands::{Cmd, CommandError};
pub use document::Document;
pub use editor::TemplateEditor;
pub use patch::Patch;
