//! Key management commands.

pub mod add;
pub mod list;
pub mod remove;
pub mod storage;
