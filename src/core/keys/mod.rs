//! Key resolution.
//!
//! [`KeyManager`] answers "which key do I use for context X". How it gets
//! the answer depends on the storage mode:
//!
//! - **local**: the key is read from the storage document; importing from a
//!   cluster fetches once and stores the key itself.
//! - **cluster**: only the Secret coordinates are stored; every lookup
//!   fetches the key from the cluster again. Nothing is cached.
//!
//! Public keys are always derived from the private key.

use std::collections::BTreeMap;
use std::str::FromStr;

use age::x25519;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::core::cluster::{ClusterKeyFetch, ContextResolver};
use crate::core::constants;
use crate::core::domain::{ClusterReference, Context, ModeChange, StorageMode};
use crate::core::store::KeyStorage;
use crate::core::types::{ContextName, PublicKey};
use crate::error::{KeyError, Result};

mod strategy;

use strategy::{Backends, ModeStrategy};

/// Key lookups needed to decrypt and re-encrypt a secret.
pub trait KeySource {
    /// Private key for `context`.
    fn identity(&self, context: &str) -> Result<x25519::Identity>;

    /// Recipient derived from the private key for `context`.
    fn recipient(&self, context: &str) -> Result<x25519::Recipient> {
        Ok(self.identity(context)?.to_public())
    }
}

/// Result of importing a key from a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyImport {
    pub context: ContextName,
    pub mode: StorageMode,
    pub public_key: PublicKey,
}

/// Resolves contexts to keys.
pub struct KeyManager {
    storage: Box<dyn KeyStorage>,
    cluster: Box<dyn ClusterKeyFetch>,
    resolver: Box<dyn ContextResolver>,
    strategy: Box<dyn ModeStrategy>,
}

impl KeyManager {
    /// Build a manager for the storage mode currently recorded in `storage`.
    pub fn new(
        storage: Box<dyn KeyStorage>,
        cluster: Box<dyn ClusterKeyFetch>,
        resolver: Box<dyn ContextResolver>,
    ) -> Result<Self> {
        let mode = storage.storage_mode()?;
        debug!(mode = %mode, "key manager ready");
        Ok(Self {
            storage,
            cluster,
            resolver,
            strategy: strategy::for_mode(mode),
        })
    }

    fn backends(&self) -> Backends<'_> {
        Backends {
            storage: self.storage.as_ref(),
            cluster: self.cluster.as_ref(),
        }
    }

    /// Storage mode the manager is operating in.
    pub fn mode(&self) -> StorageMode {
        self.strategy.mode()
    }

    /// Switch the storage mode for this and future invocations.
    pub fn set_storage_mode(&mut self, mode: StorageMode) -> Result<ModeChange> {
        let change = self.storage.set_storage_mode(mode)?;
        if let ModeChange::Changed { from, to } = change {
            info!(from = %from, to = %to, "storage mode changed");
            self.strategy = strategy::for_mode(to);
        }
        Ok(change)
    }

    /// Use `context` when given, otherwise ask the resolver.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::NoCurrentContext` if no context is given and none
    /// can be resolved.
    pub fn resolve_context(&self, context: Option<&str>) -> Result<ContextName> {
        if let Some(name) = context.map(str::trim).filter(|c| !c.is_empty()) {
            return Ok(name.to_string());
        }
        match self.resolver.current_context() {
            Ok(name) if !name.trim().is_empty() => {
                debug!(context = %name, "using current context");
                Ok(name.trim().to_string())
            }
            Ok(_) => Err(KeyError::NoCurrentContext.into()),
            Err(e) => {
                debug!(error = %e, "current context lookup failed");
                Err(KeyError::NoCurrentContext.into())
            }
        }
    }

    /// Validated private key material for a context.
    pub fn private_key_material(&self, context: Option<&str>) -> Result<Zeroizing<String>> {
        let context = self.resolve_context(context)?;
        self.strategy.private_key(&self.backends(), &context)
    }

    /// Private key for a context.
    pub fn private_key(&self, context: Option<&str>) -> Result<x25519::Identity> {
        let material = self.private_key_material(context)?;
        parse_identity(&material)
    }

    /// Public key for a context, derived from its private key.
    pub fn public_key(&self, context: Option<&str>) -> Result<x25519::Recipient> {
        Ok(self.private_key(context)?.to_public())
    }

    /// Import the key stored in a cluster Secret.
    ///
    /// In local mode the key itself is stored; in cluster mode the key is
    /// fetched once to check the reference, and only the reference is kept.
    pub fn add_key_from_cluster(
        &self,
        context: Option<&str>,
        reference: &ClusterReference,
    ) -> Result<KeyImport> {
        let context = self.resolve_context(context)?;
        let key = self
            .strategy
            .add_key_from_cluster(&self.backends(), &context, reference)?;
        let public_key = parse_identity(&key)?.to_public().to_string();

        info!(context = %context, mode = %self.mode(), "key imported");
        Ok(KeyImport {
            context,
            mode: self.mode(),
            public_key,
        })
    }

    /// All stored contexts.
    pub fn contexts(&self) -> Result<BTreeMap<ContextName, Context>> {
        self.storage.contexts()
    }

    /// Names of contexts holding a local private key.
    pub fn contexts_with_keys(&self) -> Result<Vec<ContextName>> {
        self.storage.contexts_with_keys()
    }

    /// Remove one context.
    pub fn remove_context(&self, context: &str) -> Result<()> {
        self.storage.remove_context(context)?;
        info!(context, "context removed");
        Ok(())
    }

    /// Remove every context.
    pub fn remove_all(&self) -> Result<Vec<ContextName>> {
        let removed = self.storage.remove_all()?;
        info!(count = removed.len(), "all contexts removed");
        Ok(removed)
    }
}

impl KeySource for KeyManager {
    fn identity(&self, context: &str) -> Result<x25519::Identity> {
        self.private_key(Some(context))
    }
}

/// Find the age private key inside raw key file content.
///
/// Takes everything from the `AGE-SECRET-KEY-` marker to the end of that
/// line, so comments such as `# created:` and `# public key:` are skipped.
pub fn extract_private_key(raw: &str) -> Option<&str> {
    let start = raw.find(constants::AGE_KEY_MARKER)?;
    let rest = &raw[start..];
    let line = rest.lines().next().unwrap_or(rest);
    let key = line.trim();
    (!key.is_empty()).then_some(key)
}

/// Parse and validate an age private key.
///
/// # Errors
///
/// Returns `KeyError::InvalidFormat` if `key` is not a valid x25519 identity.
pub fn parse_identity(key: &str) -> Result<x25519::Identity> {
    x25519::Identity::from_str(key.trim())
        .map_err(|e| KeyError::InvalidFormat(e.to_string()).into())
}
