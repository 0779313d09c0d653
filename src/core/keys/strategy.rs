//! Per-mode key resolution.
//!
//! The storage mode picks one strategy when the [`KeyManager`](super::KeyManager)
//! is built; every lookup and import then goes through it.

use tracing::debug;
use zeroize::Zeroizing;

use super::{extract_private_key, parse_identity};
use crate::core::cluster::ClusterKeyFetch;
use crate::core::domain::{ClusterReference, StorageMode};
use crate::core::store::KeyStorage;
use crate::error::{Error, KeyError, Result, StoreError};

/// Collaborators a strategy works against.
pub(super) struct Backends<'a> {
    pub storage: &'a dyn KeyStorage,
    pub cluster: &'a dyn ClusterKeyFetch,
}

/// Mode-specific key behaviour.
pub(super) trait ModeStrategy {
    fn mode(&self) -> StorageMode;

    /// Validated private key material for `context`.
    fn private_key(&self, backends: &Backends<'_>, context: &str) -> Result<Zeroizing<String>>;

    /// Import the key behind `reference` for `context`.
    fn add_key_from_cluster(
        &self,
        backends: &Backends<'_>,
        context: &str,
        reference: &ClusterReference,
    ) -> Result<Zeroizing<String>>;
}

pub(super) fn for_mode(mode: StorageMode) -> Box<dyn ModeStrategy> {
    match mode {
        StorageMode::Local => Box::new(Local),
        StorageMode::Cluster => Box::new(Cluster),
    }
}

/// Keys live in the storage document; the cluster is only read at import.
struct Local;

impl ModeStrategy for Local {
    fn mode(&self) -> StorageMode {
        StorageMode::Local
    }

    fn private_key(&self, backends: &Backends<'_>, context: &str) -> Result<Zeroizing<String>> {
        let key = backends
            .storage
            .private_key(context)?
            .ok_or_else(|| KeyError::NoPrivateKey(context.to_string()))?;
        parse_identity(&key)?;
        Ok(key)
    }

    fn add_key_from_cluster(
        &self,
        backends: &Backends<'_>,
        context: &str,
        reference: &ClusterReference,
    ) -> Result<Zeroizing<String>> {
        let key = fetch_key(backends, context, reference)?;
        backends.storage.save_private_key(context, &key)?;
        debug!(context, "stored private key locally");
        Ok(key)
    }
}

/// Only the reference is stored; every lookup fetches the key again.
struct Cluster;

impl ModeStrategy for Cluster {
    fn mode(&self) -> StorageMode {
        StorageMode::Cluster
    }

    fn private_key(&self, backends: &Backends<'_>, context: &str) -> Result<Zeroizing<String>> {
        let entry = match backends.storage.context(context) {
            Ok(entry) => entry,
            Err(Error::Store(StoreError::ContextNotFound(_))) => {
                return Err(KeyError::NoPrivateKey(context.to_string()).into())
            }
            Err(e) => return Err(e),
        };

        if let Some(reference) = entry.reference() {
            return fetch_key(backends, context, &reference);
        }

        // Imported before the switch to cluster mode.
        match entry.private_key() {
            Some(key) => {
                debug!(context, "no cluster reference, using locally stored key");
                parse_identity(key)?;
                Ok(Zeroizing::new(key.to_string()))
            }
            None => Err(KeyError::NoPrivateKey(context.to_string()).into()),
        }
    }

    fn add_key_from_cluster(
        &self,
        backends: &Backends<'_>,
        context: &str,
        reference: &ClusterReference,
    ) -> Result<Zeroizing<String>> {
        let key = fetch_key(backends, context, reference)?;
        backends.storage.save_reference(context, reference)?;
        debug!(context, reference = %reference, "stored cluster reference");
        Ok(key)
    }
}

/// Fetch, extract and validate the key behind `reference`.
fn fetch_key(
    backends: &Backends<'_>,
    context: &str,
    reference: &ClusterReference,
) -> Result<Zeroizing<String>> {
    let raw = backends
        .cluster
        .fetch(context, reference)
        .map_err(|e| match e {
            Error::Cluster(source) => KeyError::Cluster {
                context: context.to_string(),
                source,
            }
            .into(),
            other => other,
        })?;

    let key = extract_private_key(&raw).ok_or_else(|| KeyError::MarkerNotFound {
        namespace: reference.namespace.clone(),
        secret_name: reference.secret_name.clone(),
        key_name: reference.key_name.clone(),
    })?;
    parse_identity(key)?;
    Ok(Zeroizing::new(key.to_string()))
}
