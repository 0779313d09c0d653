//! Storage mode command.
//!
//! Show or switch whether keys are kept locally or fetched from the cluster.

use crate::cli::{key_manager, output};
use crate::core::domain::{ModeChange, StorageMode};
use crate::error::Result;

/// Print the storage mode, or switch it when `mode` is given.
pub fn execute(mode: Option<&str>) -> Result<()> {
    let mut manager = key_manager()?;

    let Some(requested) = mode else {
        output::data(manager.mode().as_str());
        return Ok(());
    };

    let requested: StorageMode = requested.parse()?;
    match manager.set_storage_mode(requested)? {
        ModeChange::Unchanged(mode) => {
            output::dimmed(&format!("key storage mode is already {mode}"));
        }
        ModeChange::Changed { to, .. } => {
            output::success(&format!("key storage mode set to {to}"));
            if to == StorageMode::Cluster {
                output::hint(&format!(
                    "contexts without a cluster reference keep using their local key; run {} to add one",
                    output::cmd("kage key add")
                ));
            }
        }
    }

    Ok(())
}
