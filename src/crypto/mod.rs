/// Symmetric encryption for workflow graphs at rest
///
/// Text in, hex text out. Every message gets a fresh random nonce which is
/// stored in front of the ciphertext, so identical graphs never produce
/// identical stored blobs. The GCM tag makes tampering a decryption error
/// rather than silent garbage.

use crate::config::CryptoConfig;
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};

/// Nonce length for AES-GCM (96 bits)
const NONCE_LEN: usize = 12;

/// Authentication tag length appended by AES-GCM
const TAG_LEN: usize = 16;

/// Errors raised by the crypto codec
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("encryption failed")]
    Encryption,

    #[error("ciphertext is not valid hex: {0}")]
    MalformedHex(#[from] hex::FromHexError),

    #[error("ciphertext too short ({0} bytes)")]
    Truncated(usize),

    /// Wrong key, or the blob was modified after encryption
    #[error("decryption failed")]
    Decryption,

    #[error("decrypted payload is not UTF-8")]
    NotUtf8(#[from] std::string::FromUtf8Error),
}

/// AES-256-GCM codec keyed once at startup
#[derive(Clone)]
pub struct CryptoCodec {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for CryptoCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoCodec").finish_non_exhaustive()
    }
}

impl CryptoCodec {
    pub fn new(config: &CryptoConfig) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(&config.key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypt `plaintext`, returning lowercase hex of `nonce || ciphertext`
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encryption)?;

        let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&ciphertext);
        Ok(hex::encode(blob))
    }

    /// Reverse of [`CryptoCodec::encrypt`]
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, CryptoError> {
        let blob = hex::decode(ciphertext)?;
        if blob.len() < NONCE_LEN + TAG_LEN {
            return Err(CryptoError::Truncated(blob.len()));
        }

        let (nonce, body) = blob.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| CryptoError::Decryption)?;

        Ok(String::from_utf8(plaintext)?)
    }
}
