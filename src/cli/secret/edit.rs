//! Secret edit command.
//!
//! Decrypt, open in the editor, and re-encrypt in place.

use std::io::{self, IsTerminal};
use std::path::Path;

use dialoguer::Select;

use crate::cli::secret::resolve_file;
use crate::cli::{key_manager, output, DecodeArgs};
use crate::core::cipher::Age;
use crate::core::edit::{EditOutcome, FieldSelection, SecretEdit};
use crate::core::editor::ExternalEditor;
use crate::core::types::FieldKey;
use crate::error::Result;

fn selection(decode: &DecodeArgs) -> FieldSelection {
    match decode.key.as_deref().map(str::trim) {
        Some(field) if !field.is_empty() => FieldSelection::Named(field.to_string()),
        _ if decode.decode || decode.key.is_some() => FieldSelection::Default,
        _ => FieldSelection::Whole,
    }
}

fn pick_field(fields: &[FieldKey]) -> Result<FieldKey> {
    let index = Select::new()
        .with_prompt("Field to edit")
        .items(fields)
        .default(0)
        .interact()?;
    Ok(fields[index].clone())
}

/// Edit `file` with the key of `context` (or the current context).
pub fn execute(context: Option<&str>, file: &Path, decode: &DecodeArgs) -> Result<()> {
    let file = resolve_file(file)?;
    let manager = key_manager()?;
    let context = manager.resolve_context(context)?;
    let editor = ExternalEditor::from_env();

    let mut edit = SecretEdit::new(&manager, &Age, &editor);
    if io::stdin().is_terminal() {
        edit = edit.with_picker(Box::new(pick_field));
    }

    match edit.run(&context, &file, &selection(decode))? {
        EditOutcome::Unchanged => output::dimmed("No changes made to the file"),
        EditOutcome::Saved { field: Some(field), .. } => output::success(&format!(
            "File edited and encrypted successfully ({})",
            output::key(&field)
        )),
        EditOutcome::Saved { field: None, .. } => {
            output::success("File edited and encrypted successfully")
        }
    }

    Ok(())
}
