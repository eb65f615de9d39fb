//! String encryption at rest
//!
//! Ciphertext is `base64(nonce || aes-256-gcm(plaintext))` with a fresh
//! 96-bit nonce per call.

use crate::error::{ServiceError, ServiceResult};
use aes_gcm::{
    Aes256Gcm,
    aead::{Aead, KeyInit, generic_array::GenericArray},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::{RngCore, rngs::OsRng};
use std::collections::HashMap;
use tracing::warn;
use zeroize::Zeroizing;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Encrypts and decrypts configuration strings
pub trait CipherService: Send + Sync {
    /// Encrypt `plaintext`; `None` for empty input
    ///
    /// # Errors
    /// [`ServiceError::EncryptionFailed`].
    fn encrypt(&self, plaintext: &str) -> ServiceResult<Option<String>>;

    /// Decrypt `ciphertext`; `None` for empty input
    ///
    /// # Errors
    /// [`ServiceError::DecryptionFailed`] for malformed or tampered input.
    fn decrypt(&self, ciphertext: &str) -> ServiceResult<Option<String>>;

    /// Decrypt every value of `properties`
    ///
    /// Values that do not decrypt are kept unchanged, so plain and encrypted
    /// entries can share one map.
    fn decrypt_properties(&self, properties: HashMap<String, String>) -> HashMap<String, String> {
        properties
            .into_iter()
            .map(|(name, value)| match self.decrypt(&value) {
                Ok(Some(plain)) => (name, plain),
                Ok(None) => (name, value),
                Err(e) => {
                    warn!(property = %name, error = %e, "property kept as stored");
                    (name, value)
                }
            })
            .collect()
    }
}

/// AES-256-GCM cipher under one master key
pub struct AesGcmCipher {
    key: Zeroizing<[u8; 32]>,
}

impl AesGcmCipher {
    /// Cipher using `key` as master key
    #[must_use]
    pub fn new(key: [u8; 32]) -> Self {
        Self {
            key: Zeroizing::new(key),
        }
    }

    /// Cipher with a fresh random master key
    #[must_use]
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        let cipher = Self::new(key);
        zeroize::Zeroize::zeroize(&mut key);
        cipher
    }

    /// Cipher from a base64 master key
    ///
    /// # Errors
    /// [`ServiceError::InvalidKey`] unless the input decodes to 32 bytes.
    pub fn from_base64(encoded: &str) -> ServiceResult<Self> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|e| ServiceError::InvalidKey(format!("master key is not base64: {e}")))?,
        );
        let key: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            ServiceError::InvalidKey(format!("master key must be 32 bytes, got {}", bytes.len()))
        })?;
        Ok(Self::new(key))
    }

    fn cipher(&self) -> ServiceResult<Aes256Gcm> {
        Aes256Gcm::new_from_slice(&self.key[..])
            .map_err(|e| ServiceError::InvalidKey(format!("Invalid master key: {e}")))
    }
}

impl std::fmt::Debug for AesGcmCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AesGcmCipher").finish_non_exhaustive()
    }
}

impl CipherService for AesGcmCipher {
    fn encrypt(&self, plaintext: &str) -> ServiceResult<Option<String>> {
        if plaintext.is_empty() {
            return Ok(None);
        }

        let mut nonce = vec![0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let ciphertext = self
            .cipher()?
            .encrypt(GenericArray::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| ServiceError::EncryptionFailed("string encryption failed".into()))?;

        let mut sealed = nonce;
        sealed.extend_from_slice(&ciphertext);
        Ok(Some(STANDARD.encode(sealed)))
    }

    fn decrypt(&self, ciphertext: &str) -> ServiceResult<Option<String>> {
        if ciphertext.is_empty() {
            return Ok(None);
        }

        let sealed = STANDARD
            .decode(ciphertext)
            .map_err(|e| ServiceError::DecryptionFailed(format!("not base64: {e}")))?;
        if sealed.len() < NONCE_LEN + TAG_LEN {
            return Err(ServiceError::DecryptionFailed(
                "ciphertext too short".into(),
            ));
        }

        let (nonce, body) = sealed.split_at(NONCE_LEN);
        let plain = Zeroizing::new(
            self.cipher()?
                .decrypt(GenericArray::from_slice(nonce), body)
                .map_err(|_| ServiceError::DecryptionFailed("authentication failed".into()))?,
        );
        let text = std::str::from_utf8(&plain)
            .map_err(|_| ServiceError::DecryptionFailed("plaintext is not UTF-8".into()))?;
        Ok(Some(text.to_string()))
    }
}
