//! Core library components.
//!
//! Key resolution, encryption, the field codec and the edit pipeline. Nothing
//! in here prints; the CLI layer owns all terminal output.

pub mod cipher;
pub mod cluster;
pub mod codec;
pub mod constants;
pub mod domain;
pub mod edit;
pub mod editor;
pub mod fs;
pub mod keys;
pub mod secret;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;
