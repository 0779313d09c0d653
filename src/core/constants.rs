//! Constants used throughout kage.
//!
//! Centralizes magic strings and default values.

/// Directory under HOME holding kage state (~/.kage).
pub const STATE_DIR: &str = ".kage";

/// Key storage document file name (~/.kage/kage-config.yaml).
pub const CONFIG_FILE: &str = "kage-config.yaml";

/// Environment variable overriding the key storage document path.
pub const CONFIG_ENV: &str = "KAGE_CONFIG";

/// Environment variable naming the editor to launch.
pub const EDITOR_ENV: &str = "KAGE_EDITOR";

/// Fallback editor variables, checked in order after [`EDITOR_ENV`].
pub const FALLBACK_EDITOR_ENVS: &[&str] = &["VISUAL", "EDITOR"];

/// Editor used when nothing is configured.
#[cfg(not(windows))]
pub const DEFAULT_EDITOR: &str = "nano";

/// Editor used when nothing is configured.
#[cfg(windows)]
pub const DEFAULT_EDITOR: &str = "notepad";

/// Namespace holding the age key secret by default.
pub const DEFAULT_KEY_NAMESPACE: &str = "flux-system";

/// Name of the secret holding the age key by default.
pub const DEFAULT_KEY_SECRET: &str = "sops-age";

/// Field of the secret holding the age key by default.
pub const DEFAULT_KEY_FIELD: &str = "age.agekey";

/// Namespace used for new secrets when none is given.
pub const DEFAULT_SECRET_NAMESPACE: &str = "default";

/// Marker that starts an age private key line.
pub const AGE_KEY_MARKER: &str = "AGE-SECRET-KEY-";

/// Prefix of the temporary directory used while editing.
pub const EDIT_DIR_PREFIX: &str = "kage-edit-";

/// Name of the temporary file when a whole document is edited.
pub const EDIT_FILE_NAME: &str = "decrypted_secret.yaml";

/// Prefix of sibling temp files created by atomic writes.
pub const ATOMIC_TMP_PREFIX: &str = ".kage-write-";

/// Permission bits for files holding plaintext or key material.
pub const PRIVATE_FILE_MODE: u32 = 0o600;

/// Permission bits for directories holding plaintext or key material.
pub const PRIVATE_DIR_MODE: u32 = 0o700;
