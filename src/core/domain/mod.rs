//! Domain types.

mod context;
mod storage_mode;

pub use context::{ClusterReference, Context};
pub use storage_mode::{ModeChange, StorageMode};
