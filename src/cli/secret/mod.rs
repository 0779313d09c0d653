//! Secret commands.

pub mod create;
pub mod decrypt;
pub mod edit;

use std::path::{Path, PathBuf};

use crate::error::{Result, ValidationError};

/// Check that `file` is an existing regular file and make it absolute.
pub(crate) fn resolve_file(file: &Path) -> Result<PathBuf> {
    if !file.is_file() {
        return Err(ValidationError::FileNotFound(file.to_path_buf()).into());
    }
    Ok(std::fs::canonicalize(file)?)
}
