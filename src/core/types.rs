//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// A kubeconfig context name (e.g., `prod-eu-1`).
pub type ContextName = String;

/// An age public key string (starts with "age1...").
pub type PublicKey = String;

/// A field name inside a Secret's `data` section (e.g., `config.yaml`).
pub type FieldKey = String;
