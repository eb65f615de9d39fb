//! In-process key store
//!
//! Private keys never leave the process. Each entry is built completely before
//! it is inserted, so concurrent readers see either the whole key or nothing.

use crate::error::{CryptoError, CryptoResult};
use crate::provider::CryptoProvider;
use crate::signing::{self, MIN_RSA_KEY_BITS, PrivateKey, PublicKey};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use signet_jwk::{AlgorithmFamily, JsonWebKey, JsonWebKeySet, SignatureAlgorithm};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

struct StoredKey {
    private: PrivateKey,
    document: JsonWebKey,
}

/// Software keystore backend
pub struct SoftwareKeyStore {
    keys: DashMap<String, Arc<StoredKey>>,
    rsa_key_bits: usize,
}

impl SoftwareKeyStore {
    /// Create an empty store generating RSA keys of `rsa_key_bits`
    ///
    /// # Errors
    /// Returns [`CryptoError::Structural`] for moduli below 2048 bits.
    pub fn new(rsa_key_bits: usize) -> CryptoResult<Self> {
        if rsa_key_bits < MIN_RSA_KEY_BITS {
            return Err(CryptoError::structural(format!(
                "RSA keys must be at least {MIN_RSA_KEY_BITS} bits, got {rsa_key_bits}"
            )));
        }
        Ok(Self {
            keys: DashMap::new(),
            rsa_key_bits,
        })
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when no keys are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn stored(&self, kid: &str) -> Option<Arc<StoredKey>> {
        self.keys.get(kid).map(|entry| Arc::clone(entry.value()))
    }
}

impl Default for SoftwareKeyStore {
    fn default() -> Self {
        Self {
            keys: DashMap::new(),
            rsa_key_bits: MIN_RSA_KEY_BITS,
        }
    }
}

impl std::fmt::Debug for SoftwareKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareKeyStore")
            .field("keys", &self.keys.len())
            .field("rsa_key_bits", &self.rsa_key_bits)
            .finish()
    }
}

fn required_kid(key_id: Option<&str>, algorithm: SignatureAlgorithm) -> CryptoResult<&str> {
    key_id
        .filter(|kid| !kid.is_empty())
        .ok_or_else(|| CryptoError::structural(format!("{algorithm} requires a key id")))
}

impl CryptoProvider for SoftwareKeyStore {
    fn generate_key(
        &self,
        algorithm: SignatureAlgorithm,
        expiration: DateTime<Utc>,
    ) -> CryptoResult<JsonWebKey> {
        let private = PrivateKey::generate(algorithm, self.rsa_key_bits)?;
        let kid = Uuid::new_v4().to_string();
        let material = private.public_material()?;
        let document = JsonWebKey::new(kid.clone(), algorithm, expiration, material)?;

        self.keys.insert(
            kid.clone(),
            Arc::new(StoredKey {
                private,
                document: document.clone(),
            }),
        );
        debug!(algorithm = %algorithm, kid = %kid, "generated key");
        Ok(document)
    }

    fn sign(
        &self,
        signing_input: &str,
        key_id: Option<&str>,
        shared_secret: Option<&str>,
        algorithm: SignatureAlgorithm,
    ) -> CryptoResult<String> {
        if algorithm.family() == AlgorithmFamily::Hmac {
            return signing::hmac_sign(algorithm, shared_secret, signing_input);
        }

        let kid = required_kid(key_id, algorithm)?;
        let stored = self
            .stored(kid)
            .ok_or_else(|| CryptoError::key_not_found(kid))?;
        stored.private.sign(kid, algorithm, signing_input)
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
        if algorithm.family() == AlgorithmFamily::Hmac {
            return signing::hmac_verify(algorithm, shared_secret, signing_input, signature);
        }

        let kid = required_kid(key_id, algorithm)?;
        let public = match key_set.get(kid) {
            Some(document) => PublicKey::from_jwk(document)?,
            None => {
                let stored = self
                    .stored(kid)
                    .ok_or_else(|| CryptoError::key_not_found(kid))?;
                PublicKey::from_jwk(&stored.document)?
            }
        };
        public.verify(kid, algorithm, signing_input, signature)
    }

    fn delete_key(&self, key_id: &str) -> CryptoResult<bool> {
        let removed = self.keys.remove(key_id).is_some();
        debug!(kid = %key_id, removed, "delete key");
        Ok(removed)
    }

    fn jwks(&self, key_set: &JsonWebKeySet) -> CryptoResult<JsonWebKeySet> {
        let mut published = JsonWebKeySet::with_capacity(key_set.len());
        for requested in key_set {
            if let Some(stored) = self.stored(&requested.kid) {
                published.push(stored.document.clone())?;
            }
        }
        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_rsa_modulus() {
        assert!(matches!(
            SoftwareKeyStore::new(1024),
            Err(CryptoError::Structural(_))
        ));
    }

    #[test]
    fn hmac_keys_are_not_generated() {
        let store = SoftwareKeyStore::default();
        let result = store.generate_key(SignatureAlgorithm::Hs256, Utc::now());
        assert!(matches!(result, Err(CryptoError::UnsupportedAlgorithm(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn sign_without_kid_is_structural() {
        let store = SoftwareKeyStore::default();
        let result = store.sign("a.b", None, None, SignatureAlgorithm::Es256);
        assert!(matches!(result, Err(CryptoError::Structural(_))));
    }

    #[test]
    fn sign_with_unknown_kid_is_not_found() {
        let store = SoftwareKeyStore::default();
        let result = store.sign("a.b", Some("missing"), None, SignatureAlgorithm::Es256);
        assert!(matches!(result, Err(CryptoError::KeyNotFound(kid)) if kid == "missing"));
    }

    #[test]
    fn jwks_drops_unknown_kids_and_keeps_order() {
        let store = SoftwareKeyStore::default();
        let exp = Utc::now();
        let first = store.generate_key(SignatureAlgorithm::Es384, exp).unwrap();
        let second = store.generate_key(SignatureAlgorithm::Es256, exp).unwrap();
        let deleted = store.generate_key(SignatureAlgorithm::Es512, exp).unwrap();
        assert!(store.delete_key(&deleted.kid).unwrap());

        let requested =
            JsonWebKeySet::try_from(vec![second.clone(), deleted, first.clone()]).unwrap();
        let published = store.jwks(&requested).unwrap();
        let kids: Vec<_> = published.iter().map(|k| k.kid.clone()).collect();
        assert_eq!(kids, [second.kid, first.kid]);
    }

    #[test]
    fn verify_prefers_supplied_document() {
        let store = SoftwareKeyStore::default();
        let key = store.generate_key(SignatureAlgorithm::Es256, Utc::now()).unwrap();
        let signature = store
            .sign("h.p", Some(&key.kid), None, SignatureAlgorithm::Es256)
            .unwrap();
        let supplied = JsonWebKeySet::try_from(vec![key.clone()]).unwrap();
        assert!(store.delete_key(&key.kid).unwrap());

        let verified = store
            .verify_signature(
                "h.p",
                &signature,
                Some(&key.kid),
                &supplied,
                None,
                SignatureAlgorithm::Es256,
            )
            .unwrap();
        assert!(verified);
    }
}
