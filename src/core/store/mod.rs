//! Key storage.
//!
//! Persists the storage mode and per-context key material or cluster
//! references. The [`KeyStorage`] trait is the only way other components
//! touch the key storage document.
//!
//! ## Adding a New Storage Backend
//!
//! 1. Implement the `KeyStorage` trait
//! 2. Add the implementation in a new file (e.g., `keychain.rs`)
//! 3. Re-export from this module

use std::collections::BTreeMap;

use zeroize::Zeroizing;

use crate::core::domain::{ClusterReference, Context, ModeChange, StorageMode};
use crate::core::types::ContextName;
use crate::error::Result;

mod document;
mod fs;

pub use document::StorageDocument;
pub use fs::Filesystem;

/// Key storage trait.
///
/// A missing or unreadable backing document reads as empty storage; write
/// failures are always returned to the caller.
pub trait KeyStorage {
    /// Current storage mode (`local` when never set).
    fn storage_mode(&self) -> Result<StorageMode>;

    /// Switch the storage mode.
    ///
    /// Setting the mode that is already active writes nothing and returns
    /// [`ModeChange::Unchanged`].
    fn set_storage_mode(&self, mode: StorageMode) -> Result<ModeChange>;

    /// Upsert the private key of a context, creating the context if absent.
    fn save_private_key(&self, context: &str, key: &str) -> Result<()>;

    /// Private key of a context.
    ///
    /// Returns `Ok(None)` when the context is unknown or holds no key.
    fn private_key(&self, context: &str) -> Result<Option<Zeroizing<String>>>;

    /// Record where a context's key can be fetched from.
    ///
    /// Replaces the context entry, so no previously stored key survives.
    fn save_reference(&self, context: &str, reference: &ClusterReference) -> Result<()>;

    /// Look up a context.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ContextNotFound` if it does not exist.
    fn context(&self, name: &str) -> Result<Context>;

    /// All contexts, ordered by name.
    fn contexts(&self) -> Result<BTreeMap<ContextName, Context>>;

    /// Names of contexts holding a non-empty local private key, ordered.
    fn contexts_with_keys(&self) -> Result<Vec<ContextName>> {
        Ok(self
            .contexts()?
            .into_iter()
            .filter(|(_, ctx)| ctx.has_private_key())
            .map(|(name, _)| name)
            .collect())
    }

    /// Remove a context and everything stored for it.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ContextNotFound` (and writes nothing) if it
    /// does not exist.
    fn remove_context(&self, name: &str) -> Result<()>;

    /// Remove every context, returning their names.
    fn remove_all(&self) -> Result<Vec<ContextName>>;
}
