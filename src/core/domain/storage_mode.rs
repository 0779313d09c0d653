//! Storage mode type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ValidationError};

/// Where context keys live.
///
/// `Local` keeps the private key in the key storage document. `Cluster`
/// keeps only a reference and fetches the key from the cluster on every use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    #[default]
    Local,
    Cluster,
}

impl StorageMode {
    /// String form used in the document and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageMode::Local => "local",
            StorageMode::Cluster => "cluster",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "local" => Ok(StorageMode::Local),
            "cluster" => Ok(StorageMode::Cluster),
            other => Err(ValidationError::InvalidStorageMode(other.to_string()).into()),
        }
    }
}

/// Outcome of a storage mode update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    /// The requested mode was already active; nothing was written.
    Unchanged(StorageMode),
    /// The mode was switched.
    Changed { from: StorageMode, to: StorageMode },
}
