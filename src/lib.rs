//! Kage - Edit age-encrypted Kubernetes secrets with per-cluster keys.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── key           # add, list, remove, storage-mode
//! │   ├── secret        # edit, decrypt, create
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── cipher/       # Encryption service
//!     │   ├── mod       # Cipher trait
//!     │   └── age       # age x25519 implementation
//!     ├── cluster       # kubectl-backed key fetch and context lookup
//!     ├── keys/         # Key manager and storage mode strategies
//!     ├── store/        # Key storage document
//!     ├── codec         # Base64 field decode / re-encode
//!     ├── editor        # External editor
//!     ├── edit          # Edit pipeline
//!     ├── secret        # Secret manifest construction
//!     └── fs            # Atomic writes and the private edit workspace
//! ```
//!
//! # Features
//!
//! - One age key per cluster context
//! - Keys kept locally or fetched from the cluster on every use
//! - Whole-document or single-field editing with atomic writes
//! - Plaintext only ever lives in memory or in a private temp directory

pub mod cli;
pub mod core;
pub mod error;
