//! Encryption service.
//!
//! Secret files are encrypted as a whole. The private key and recipient are
//! passed to every call; nothing is stashed in the environment or on the
//! cipher itself.

use std::path::Path;

use ::age::x25519;
use zeroize::Zeroizing;

use crate::error::{CipherError, Result};

mod age;

pub use self::age::Age;

/// Encrypts and decrypts secret documents.
pub trait Cipher {
    /// Decrypt the file at `path` with `identity`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::ReadFailed` if the file cannot be read, and
    /// `CipherError::DecryptionFailed` if it is not encrypted for `identity`.
    fn decrypt_file(&self, path: &Path, identity: &x25519::Identity) -> Result<Zeroizing<Vec<u8>>> {
        let blob = std::fs::read(path).map_err(|source| CipherError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        self.decrypt_data(&blob, identity)
    }

    /// Decrypt an in-memory blob.
    fn decrypt_data(&self, blob: &[u8], identity: &x25519::Identity) -> Result<Zeroizing<Vec<u8>>>;

    /// Encrypt `plaintext` for `recipient`.
    fn encrypt_data(&self, plaintext: &[u8], recipient: &x25519::Recipient) -> Result<Vec<u8>>;
}
