//! Filesystem-based key storage implementation.
//!
//! Keeps the whole key storage document in one YAML file
//! (`~/.kage/kage-config.yaml` unless `KAGE_CONFIG` points elsewhere).
//! Every operation reads the file, applies its change and writes it back
//! atomically with 0600 permissions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{KeyStorage, StorageDocument};
use crate::core::constants;
use crate::core::domain::{ClusterReference, Context, ModeChange, StorageMode};
use crate::core::fs::{atomic_write, create_private_dir};
use crate::core::types::ContextName;
use crate::error::{Result, StoreError};

/// YAML file key storage.
#[derive(Debug, Clone)]
pub struct Filesystem {
    path: PathBuf,
}

impl Filesystem {
    /// Storage backed by the document at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage at the per-user default location.
    ///
    /// `KAGE_CONFIG` overrides the path; otherwise `~/.kage/kage-config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoHomeDir` if the home directory is unknown.
    pub fn default_location() -> Result<Self> {
        if let Some(path) = std::env::var_os(constants::CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Ok(Self::at(path));
        }
        let home = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
        Ok(Self::at(
            home.join(constants::STATE_DIR).join(constants::CONFIG_FILE),
        ))
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, treating a missing or corrupt file as empty.
    pub fn load(&self) -> StorageDocument {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "key storage unreadable, starting empty");
                return StorageDocument::default();
            }
        };

        match serde_yaml::from_str::<Option<StorageDocument>>(&contents) {
            Ok(doc) => {
                let doc = doc.unwrap_or_default();
                debug!(
                    path = %self.path.display(),
                    contexts = doc.contexts.len(),
                    mode = %doc.storage_mode,
                    "key storage loaded"
                );
                doc
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "key storage is corrupt, starting empty");
                StorageDocument::default()
            }
        }
    }

    /// Write the document atomically, creating its directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialize` or `StoreError::WriteFailed`.
    pub fn save(&self, doc: &StorageDocument) -> Result<()> {
        let contents = Zeroizing::new(serde_yaml::to_string(doc).map_err(StoreError::Serialize)?);

        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_private_dir(dir).map_err(StoreError::WriteFailed)?;
        }
        atomic_write(&self.path, contents.as_bytes(), constants::PRIVATE_FILE_MODE)
            .map_err(StoreError::WriteFailed)?;

        debug!(path = %self.path.display(), contexts = doc.contexts.len(), "key storage saved");
        Ok(())
    }
}

impl KeyStorage for Filesystem {
    fn storage_mode(&self) -> Result<StorageMode> {
        Ok(self.load().storage_mode)
    }

    fn set_storage_mode(&self, mode: StorageMode) -> Result<ModeChange> {
        let mut doc = self.load();
        let from = doc.storage_mode;
        if from == mode {
            return Ok(ModeChange::Unchanged(mode));
        }
        doc.storage_mode = mode;
        self.save(&doc)?;
        Ok(ModeChange::Changed { from, to: mode })
    }

    fn save_private_key(&self, context: &str, key: &str) -> Result<()> {
        let mut doc = self.load();
        let entry = doc.context_mut(context);
        entry.set_private_key(key);
        entry.clear_reference();
        self.save(&doc)
    }

    fn private_key(&self, context: &str) -> Result<Option<Zeroizing<String>>> {
        let doc = self.load();
        Ok(doc
            .contexts
            .get(context)
            .and_then(Context::private_key)
            .map(|k| Zeroizing::new(k.to_string())))
    }

    fn save_reference(&self, context: &str, reference: &ClusterReference) -> Result<()> {
        let mut doc = self.load();
        doc.contexts
            .insert(context.to_string(), Context::referencing(reference.clone()));
        self.save(&doc)
    }

    fn context(&self, name: &str) -> Result<Context> {
        self.load()
            .contexts
            .remove(name)
            .ok_or_else(|| StoreError::ContextNotFound(name.to_string()).into())
    }

    fn contexts(&self) -> Result<BTreeMap<ContextName, Context>> {
        Ok(self.load().contexts)
    }

    fn remove_context(&self, name: &str) -> Result<()> {
        let mut doc = self.load();
        if doc.contexts.remove(name).is_none() {
            return Err(StoreError::ContextNotFound(name.to_string()).into());
        }
        self.save(&doc)
    }

    fn remove_all(&self) -> Result<Vec<ContextName>> {
        let mut doc = self.load();
        if doc.contexts.is_empty() {
            return Ok(Vec::new());
        }
        let removed: Vec<ContextName> = std::mem::take(&mut doc.contexts).into_keys().collect();
        self.save(&doc)?;
        Ok(removed)
    }
}
