//! Key add command.
//!
//! Import the age key of a cluster from one of its Secrets.

use crate::cli::{key_manager, output};
use crate::core::domain::{ClusterReference, StorageMode};
use crate::error::Result;

/// Import a key for `context` (or the current context).
pub fn execute(context: Option<&str>, namespace: &str, secret: &str, key: &str) -> Result<()> {
    let manager = key_manager()?;
    let reference = ClusterReference::new(namespace, secret, key);
    let import = manager.add_key_from_cluster(context, &reference)?;

    match import.mode {
        StorageMode::Local => output::success(&format!(
            "key from {} stored for {}",
            output::path(&reference),
            output::key(&import.context)
        )),
        StorageMode::Cluster => output::success(&format!(
            "{} now reads its key from {}",
            output::key(&import.context),
            output::path(&reference)
        )),
    }
    output::kv("public key", &import.public_key);

    Ok(())
}
