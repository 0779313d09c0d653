//! age backend: x25519 keys, ASCII armor output.

use std::io::{Read, Write};

use ::age::armor::{ArmoredReader, ArmoredWriter, Format};
use ::age::x25519;
use tracing::trace;
use zeroize::Zeroizing;

use super::Cipher;
use crate::error::{CipherError, Result};

/// age encryption with armored output.
///
/// Decryption accepts both armored and binary input.
#[derive(Debug, Default, Clone, Copy)]
pub struct Age;

impl Cipher for Age {
    fn decrypt_data(&self, blob: &[u8], identity: &x25519::Identity) -> Result<Zeroizing<Vec<u8>>> {
        trace!(ciphertext_len = blob.len(), "decrypting");

        let decryptor = ::age::Decryptor::new(ArmoredReader::new(blob))
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        let mut reader = decryptor
            .decrypt(std::iter::once(identity as &dyn ::age::Identity))
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        let mut plaintext = Zeroizing::new(Vec::new());
        reader
            .read_to_end(&mut plaintext)
            .map_err(|e| CipherError::DecryptionFailed(e.to_string()))?;

        trace!(plaintext_len = plaintext.len(), "decrypted");
        Ok(plaintext)
    }

    fn encrypt_data(&self, plaintext: &[u8], recipient: &x25519::Recipient) -> Result<Vec<u8>> {
        trace!(plaintext_len = plaintext.len(), "encrypting");

        let encryptor =
            ::age::Encryptor::with_recipients(std::iter::once(recipient as &dyn ::age::Recipient))
                .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let mut encrypted = Vec::new();
        let armor = ArmoredWriter::wrap_output(&mut encrypted, Format::AsciiArmor)
            .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;
        let mut writer = encryptor
            .wrap_output(armor)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        writer
            .write_all(plaintext)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
        writer
            .finish()
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?
            .finish()
            .map_err(|e| CipherError::ArmorFailed(e.to_string()))?;

        trace!(ciphertext_len = encrypted.len(), "encrypted");
        Ok(encrypted)
    }
}
