//! The crypto provider contract shared by every backend

use crate::error::CryptoResult;
use chrono::{DateTime, Utc};
use signet_jwk::{JsonWebKey, JsonWebKeySet, SignatureAlgorithm, key_id};
use std::sync::Arc;

/// Key generation, signing and key-set publication
///
/// Implementations must be safe to call from many request handlers at once
/// and must never hand out a partially written key document.
pub trait CryptoProvider: Send + Sync {
    /// Create and store a new key pair, returning its public document
    ///
    /// # Errors
    /// [`CryptoError::UnsupportedAlgorithm`](crate::CryptoError::UnsupportedAlgorithm)
    /// if the backend cannot produce the family,
    /// [`CryptoError::ProviderUnavailable`](crate::CryptoError::ProviderUnavailable)
    /// if the store cannot be reached.
    fn generate_key(
        &self,
        algorithm: SignatureAlgorithm,
        expiration: DateTime<Utc>,
    ) -> CryptoResult<JsonWebKey>;

    /// Sign `signing_input`, returning a base64url signature
    ///
    /// Asymmetric algorithms select the private key by `key_id` and ignore
    /// `shared_secret`; HMAC algorithms do the opposite.
    ///
    /// # Errors
    /// `KeyNotFound` for an unknown kid, `Structural` for a missing kid or
    /// missing HMAC secret.
    fn sign(
        &self,
        signing_input: &str,
        key_id: Option<&str>,
        shared_secret: Option<&str>,
        algorithm: SignatureAlgorithm,
    ) -> CryptoResult<String>;

    /// Check a base64url signature
    ///
    /// A signature that does not match is `Ok(false)`.
    ///
    /// # Errors
    /// Malformed key material, an unsupported algorithm or an unknown kid.
    fn verify_signature(
        &self,
        signing_input: &str,
        signature: &str,
        key_id: Option<&str>,
        key_set: &JsonWebKeySet,
        shared_secret: Option<&str>,
        algorithm: SignatureAlgorithm,
    ) -> CryptoResult<bool>;

    /// Remove a key; `false` if the kid was unknown. Never fails on repeats.
    ///
    /// # Errors
    /// Only when the store cannot be reached.
    fn delete_key(&self, key_id: &str) -> CryptoResult<bool>;

    /// Public key-set document for the keys of `key_set` this provider holds
    ///
    /// # Errors
    /// When the store cannot be reached or answers with a malformed document.
    fn jwks(&self, key_set: &JsonWebKeySet) -> CryptoResult<JsonWebKeySet>;

    /// Kid of the first published key bound to `algorithm`
    ///
    /// # Errors
    /// Whatever [`CryptoProvider::jwks`] fails with.
    fn key_id(
        &self,
        key_set: &JsonWebKeySet,
        algorithm: SignatureAlgorithm,
    ) -> CryptoResult<Option<String>> {
        let published = self.jwks(key_set)?;
        Ok(key_id(&published, algorithm).map(str::to_string))
    }
}

impl<T: CryptoProvider + ?Sized> CryptoProvider for Arc<T> {
    fn generate_key(
        &self,
        algorithm: SignatureAlgorithm,
        expiration: DateTime<Utc>,
    ) -> CryptoResult<JsonWebKey> {
        (**self).generate_key(algorithm, expiration)
    }

    fn sign(
        &self,
        signing_input: &str,
        key_id: Option<&str>,
        shared_secret: Option<&str>,
        algorithm: SignatureAlgorithm,
    ) -> CryptoResult<String> {
        (**self).sign(signing_input, key_id, shared_secret, algorithm)
    }

    fn verify_signature(
        &self,
        signing_input: &str,
        signature: &str,
        key_id: Option<&str>,
        key_set: &JsonWebKeySet,
        shared_secret: Option<&str>,
        algorithm: SignatureAlgorithm,
    ) -> CryptoResult<bool> {
        (**self).verify_signature(
            signing_input,
            signature,
            key_id,
            key_set,
            shared_secret,
            algorithm,
        )
    }

    fn delete_key(&self, key_id: &str) -> CryptoResult<bool> {
        (**self).delete_key(key_id)
    }

    fn jwks(&self, key_set: &JsonWebKeySet) -> CryptoResult<JsonWebKeySet> {
        (**self).jwks(key_set)
    }

    fn key_id(
        &self,
        key_set: &JsonWebKeySet,
        algorithm: SignatureAlgorithm,
    ) -> CryptoResult<Option<String>> {
        (**self).key_id(key_set, algorithm)
    }
}
