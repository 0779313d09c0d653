//! Filesystem primitives.
//!
//! - [`atomic_write`] replaces a file so readers never see a partial write:
//!   temp file in the same directory, flush + `sync_all`, chmod, close,
//!   rename, then a best-effort sync of the directory.
//! - [`EditWorkspace`] is a private temporary directory holding the single
//!   plaintext file handed to the editor, removed when dropped.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, TempDir};
use tracing::{debug, trace, warn};

use crate::core::constants;

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` is `Some("")` for bare file names.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Atomically replace `dest` with `data`, leaving the file with `mode`
/// permission bits (ignored off Unix).
///
/// # Errors
///
/// Returns the underlying I/O error. On any failure before the rename the
/// temp file is removed and `dest` is untouched.
pub fn atomic_write(dest: &Path, data: &[u8], mode: u32) -> io::Result<()> {
    atomic_write_with(dest, mode, |file| file.write_all(data))
}

/// Like [`atomic_write`], but lets the caller fill the temp file.
///
/// If `write_fn` fails the destination is left untouched.
pub fn atomic_write_with(
    dest: &Path,
    mode: u32,
    write_fn: impl FnOnce(&mut File) -> io::Result<()>,
) -> io::Result<()> {
    let dir = parent_dir_or_dot(dest);
    trace!(path = %dest.display(), "atomic write");

    // Dropping `tmp` on an early return deletes the temp file.
    let mut tmp = Builder::new()
        .prefix(constants::ATOMIC_TMP_PREFIX)
        .tempfile_in(dir)?;

    write_fn(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    set_mode(tmp.as_file(), mode)?;

    // Closes the handle; the path still deletes itself until persisted.
    let tmp_path = tmp.into_temp_path();
    tmp_path.persist(dest).map_err(|e| e.error)?;

    // The file is already in place, so this is best-effort.
    if let Err(e) = sync_dir(dir) {
        trace!(error = %e, "directory sync skipped");
    }

    debug!(path = %dest.display(), "file replaced");
    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}

fn sync_dir(dir: &Path) -> io::Result<()> {
    File::open(dir)?.sync_all()
}

/// Create `dir` (and missing parents) restricted to the current user.
///
/// Directories that already exist keep their permissions.
pub fn create_private_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(constants::PRIVATE_DIR_MODE);
    }

    builder.create(dir)
}

/// Private temporary directory holding one file to edit.
///
/// The directory and everything in it are removed when the workspace is
/// dropped, whichever way the caller exits.
pub struct EditWorkspace {
    dir: Option<TempDir>,
    file: PathBuf,
}

impl EditWorkspace {
    /// Create the workspace and write `content` to `file_name` inside it.
    ///
    /// Names that are empty or could escape the directory fall back to
    /// `decrypted_secret.yaml`.
    pub fn create(file_name: &str, content: &[u8]) -> io::Result<Self> {
        let dir = Builder::new()
            .prefix(constants::EDIT_DIR_PREFIX)
            .tempdir()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(
                dir.path(),
                fs::Permissions::from_mode(constants::PRIVATE_DIR_MODE),
            )?;
        }

        let file = dir.path().join(safe_file_name(file_name));
        atomic_write(&file, content, constants::PRIVATE_FILE_MODE)?;

        debug!(path = %file.display(), "edit workspace created");

        Ok(Self {
            dir: Some(dir),
            file,
        })
    }

    /// Path of the file to edit.
    pub fn path(&self) -> &Path {
        &self.file
    }

    /// Directory holding the file.
    pub fn dir(&self) -> &Path {
        self.file.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl Drop for EditWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            match dir.close() {
                Ok(()) => debug!(path = %path.display(), "edit workspace removed"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to clean up temp directory"),
            }
        }
    }
}

fn safe_file_name(name: &str) -> &str {
    let trimmed = name.trim();
    let escapes = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
        || trimmed.contains('\0');
    if escapes {
        constants::EDIT_FILE_NAME
    } else {
        trimmed
    }
}
