//! Secret edit pipeline.
//!
//! decrypt → (decode field) → edit in a private temp file → compare →
//! (re-encode field) → re-encrypt → atomic write.
//!
//! Each failure is tagged with the [`EditStep`] it came from. Nothing is
//! written unless every step up to the final rename succeeds, and an edit
//! that leaves the content byte-identical stops before re-encryption.

use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use crate::core::cipher::Cipher;
use crate::core::codec::{self, ReEncode};
use crate::core::constants;
use crate::core::editor::Editor;
use crate::core::fs::{atomic_write, EditWorkspace};
use crate::core::keys::KeySource;
use crate::core::types::FieldKey;
use crate::error::{EditStep, Error, Result};

/// What part of the decrypted document is handed to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelection {
    /// The whole document.
    Whole,
    /// The only `data` field (or the one the picker chooses).
    Default,
    /// A named `data` field.
    Named(FieldKey),
}

/// How an edit ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The editor left the content as it was; nothing was written.
    Unchanged,
    /// The file was re-encrypted and replaced.
    Saved {
        path: PathBuf,
        field: Option<FieldKey>,
    },
}

/// Chooses a field when several are available.
pub type FieldPicker<'a> = Box<dyn Fn(&[FieldKey]) -> Result<FieldKey> + 'a>;

/// Inverse of the decode step.
enum Restore {
    Whole,
    Field(ReEncode),
}

impl Restore {
    fn field(&self) -> Option<&str> {
        match self {
            Restore::Whole => None,
            Restore::Field(re) => Some(re.field()),
        }
    }

    fn apply(self, edited: &[u8]) -> Result<Vec<u8>> {
        match self {
            Restore::Whole => Ok(edited.to_vec()),
            Restore::Field(re) => re.apply(edited),
        }
    }
}

trait AtStep<T> {
    fn at(self, step: EditStep) -> Result<T>;
}

impl<T, E: Into<Error>> AtStep<T> for std::result::Result<T, E> {
    fn at(self, step: EditStep) -> Result<T> {
        self.map_err(|e| Into::<Error>::into(e).at(step))
    }
}

/// Runs the edit pipeline against injected collaborators.
pub struct SecretEdit<'a> {
    keys: &'a dyn KeySource,
    cipher: &'a dyn Cipher,
    editor: &'a dyn Editor,
    picker: Option<FieldPicker<'a>>,
}

impl<'a> SecretEdit<'a> {
    pub fn new(keys: &'a dyn KeySource, cipher: &'a dyn Cipher, editor: &'a dyn Editor) -> Self {
        Self {
            keys,
            cipher,
            editor,
            picker: None,
        }
    }

    /// Ask `picker` which field to edit when the default is ambiguous.
    pub fn with_picker(mut self, picker: FieldPicker<'a>) -> Self {
        self.picker = Some(picker);
        self
    }

    /// Decrypt the whole file without editing it.
    pub fn decrypt(&self, context: &str, file: &Path) -> Result<Zeroizing<Vec<u8>>> {
        let identity = self.keys.identity(context).at(EditStep::Decrypt)?;
        self.cipher.decrypt_file(file, &identity).at(EditStep::Decrypt)
    }

    /// Edit `file` using the keys of `context`.
    pub fn run(&self, context: &str, file: &Path, selection: &FieldSelection) -> Result<EditOutcome> {
        debug!(context, path = %file.display(), "editing secret");

        let decrypted = self.decrypt(context, file)?;
        let (target, restore) = self.decode(decrypted, selection).at(EditStep::Decode)?;

        let edited = {
            let name = restore.field().unwrap_or(constants::EDIT_FILE_NAME);
            let workspace = EditWorkspace::create(name, &target).at(EditStep::Edit)?;
            self.editor.edit_file(workspace.path()).at(EditStep::Edit)?
        };

        if edited.as_slice() == target.as_slice() {
            debug!("content unchanged, nothing to write");
            return Ok(EditOutcome::Unchanged);
        }

        let field = restore.field().map(str::to_string);
        let document = Zeroizing::new(restore.apply(&edited).at(EditStep::ReEncode)?);

        let recipient = self.keys.recipient(context).at(EditStep::Encrypt)?;
        let encrypted = self
            .cipher
            .encrypt_data(&document, &recipient)
            .at(EditStep::Encrypt)?;

        atomic_write(file, &encrypted, constants::PRIVATE_FILE_MODE).at(EditStep::Commit)?;

        debug!(path = %file.display(), "secret saved");
        Ok(EditOutcome::Saved {
            path: file.to_path_buf(),
            field,
        })
    }

    fn decode(
        &self,
        decrypted: Zeroizing<Vec<u8>>,
        selection: &FieldSelection,
    ) -> Result<(Zeroizing<Vec<u8>>, Restore)> {
        let field = match selection {
            FieldSelection::Whole => return Ok((decrypted, Restore::Whole)),
            FieldSelection::Named(field) => field.clone(),
            FieldSelection::Default => self.default_field(&decrypted)?,
        };

        let (cleartext, re_encode) = codec::decode(&decrypted, &field)?;
        Ok((cleartext, Restore::Field(re_encode)))
    }

    fn default_field(&self, document: &[u8]) -> Result<FieldKey> {
        if let Some(picker) = &self.picker {
            if codec::count_entries(document)? > 1 {
                return picker(&codec::field_keys(document)?);
            }
        }
        codec::default_key(document)
    }
}
