//! Secret decrypt command.
//!
//! Print the decrypted document to stdout.

use std::io::{self, Write};
use std::path::Path;

use crate::cli::key_manager;
use crate::cli::secret::resolve_file;
use crate::core::cipher::{Age, Cipher};
use crate::core::keys::KeySource;
use crate::error::{EditStep, Result};

/// Decrypt `file` with the key of `context` (or the current context).
pub fn execute(context: Option<&str>, file: &Path) -> Result<()> {
    let file = resolve_file(file)?;
    let manager = key_manager()?;
    let context = manager.resolve_context(context)?;

    let identity = manager
        .identity(&context)
        .map_err(|e| e.at(EditStep::Decrypt))?;
    let plaintext = Age
        .decrypt_file(&file, &identity)
        .map_err(|e| e.at(EditStep::Decrypt))?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&plaintext)?;
    stdout.flush()?;
    Ok(())
}
