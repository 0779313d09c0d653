//! Context type.
//!
//! A context is a named scope (usually a kubeconfig context) that owns one
//! key relationship: either a locally stored age private key or a reference
//! to the cluster secret the key can be fetched from.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Coordinates of an age key stored in a cluster secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterReference {
    /// Namespace holding the secret
    pub namespace: String,
    /// Secret name
    pub secret_name: String,
    /// Field inside the secret's data holding the key file
    pub key_name: String,
}

impl ClusterReference {
    /// Create a new reference
    pub fn new(
        namespace: impl Into<String>,
        secret_name: impl Into<String>,
        key_name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            secret_name: secret_name.into(),
            key_name: key_name.into(),
        }
    }
}

impl fmt::Display for ClusterReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.namespace, self.secret_name, self.key_name)
    }
}

/// Per-context entry of the key storage document.
///
/// Serialized as `{privateKey, namespace, secretName, keyName}`; absent
/// fields are omitted. The private key is wiped from memory on drop.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_name: Option<String>,
}

impl Context {
    /// A context holding only a cluster reference.
    pub fn referencing(reference: ClusterReference) -> Self {
        Self {
            private_key: None,
            namespace: Some(reference.namespace),
            secret_name: Some(reference.secret_name),
            key_name: Some(reference.key_name),
        }
    }

    /// Locally stored private key, if any.
    ///
    /// An empty string in the document counts as no key.
    pub fn private_key(&self) -> Option<&str> {
        self.private_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Replace the locally stored private key.
    pub fn set_private_key(&mut self, key: impl Into<String>) {
        if let Some(old) = self.private_key.as_mut() {
            old.zeroize();
        }
        self.private_key = Some(key.into());
    }

    /// Drop the cluster reference coordinates.
    pub fn clear_reference(&mut self) {
        self.namespace = None;
        self.secret_name = None;
        self.key_name = None;
    }

    /// Cluster reference, present only when all three coordinates are set.
    pub fn reference(&self) -> Option<ClusterReference> {
        match (&self.namespace, &self.secret_name, &self.key_name) {
            (Some(ns), Some(secret), Some(key))
                if !ns.is_empty() && !secret.is_empty() && !key.is_empty() =>
            {
                Some(ClusterReference::new(ns, secret, key))
            }
            _ => None,
        }
    }

    /// Whether a private key is stored locally.
    pub fn has_private_key(&self) -> bool {
        self.private_key().is_some()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("private_key", &self.private_key().map(|_| "<redacted>"))
            .field("reference", &self.reference())
            .finish()
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Some(key) = self.private_key.as_mut() {
            key.zeroize();
        }
    }
}
