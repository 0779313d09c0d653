//! The persisted key storage document.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::core::domain::{Context, StorageMode};
use crate::core::types::ContextName;

/// Root of `kage-config.yaml`.
///
/// ```yaml
/// storageMode: local
/// contexts:
///   prod:
///     privateKey: AGE-SECRET-KEY-1...
///   staging:
///     namespace: flux-system
///     secretName: sops-age
///     keyName: age.agekey
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageDocument {
    #[serde(default, deserialize_with = "lenient_mode")]
    pub storage_mode: StorageMode,
    #[serde(default)]
    pub contexts: BTreeMap<ContextName, Context>,
}

impl StorageDocument {
    /// Context entry, created empty if absent.
    pub fn context_mut(&mut self, name: &str) -> &mut Context {
        self.contexts.entry(name.to_string()).or_default()
    }
}

// An empty or unknown mode must not make the whole document unreadable,
// or every stored key would be lost on the next write.
fn lenient_mode<'de, D>(deserializer: D) -> Result<StorageMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(match raw.as_deref().map(str::trim) {
        None | Some("") => StorageMode::default(),
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(mode = %value, "unknown storage mode in key storage, using local");
            StorageMode::default()
        }),
    })
}
