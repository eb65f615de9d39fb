//! Delegation to a remote signing service
//!
//! Private keys live in the remote service. Each operation becomes one
//! [`SigningRequest`] handed to a [`SigningTransport`]; the transport owns the
//! connection, timeouts and retries.

use crate::error::{CryptoError, CryptoResult};
use crate::provider::CryptoProvider;
use crate::signing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signet_jwk::{
    AlgorithmFamily, JsonWebKey, JsonWebKeySet, KeyRequestDescriptor, SignatureAlgorithm,
};
use std::sync::Arc;
use tracing::debug;

/// One operation sent to the signing service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SigningRequest {
    /// Create a key pair; answered with the key document
    GenerateKey {
        /// Algorithm the key is bound to
        algorithm: SignatureAlgorithm,
        /// Expiration, epoch milliseconds
        #[serde(with = "chrono::serde::ts_milliseconds")]
        expiration: DateTime<Utc>,
    },
    /// Sign with a stored key; answered with `{"sig": ...}`
    Sign {
        /// Canonical signing input
        signing_input: String,
        /// Key to sign with
        key_id: String,
        /// Signature algorithm
        algorithm: SignatureAlgorithm,
    },
    /// Verify a signature; answered with `{"verified": ...}`
    VerifySignature {
        /// Canonical signing input
        signing_input: String,
        /// Base64url signature
        signature: String,
        /// Key to verify with
        key_id: String,
        /// Signature algorithm
        algorithm: SignatureAlgorithm,
        /// Public document of the key when the caller holds it
        #[serde(default, skip_serializing_if = "Option::is_none")]
        jwks_request_param: Option<KeyRequestDescriptor>,
    },
    /// Delete a key; answered with `{"deleted": ...}`
    DeleteKey {
        /// Key to delete
        key_id: String,
    },
    /// Publish keys; answered with a `{"keys": [...]}` document
    Jwks {
        /// Keys the caller wants published
        jwks_request_param: KeyRequestDescriptor,
    },
}

impl SigningRequest {
    /// Operation name for logs
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::GenerateKey { .. } => "generateKey",
            Self::Sign { .. } => "sign",
            Self::VerifySignature { .. } => "verifySignature",
            Self::DeleteKey { .. } => "deleteKey",
            Self::Jwks { .. } => "jwks",
        }
    }
}

/// Wire to the remote signing service
pub trait SigningTransport: Send + Sync {
    /// Send `request` to `endpoint` and return the JSON response body
    ///
    /// # Errors
    /// [`CryptoError::ProviderUnavailable`] when the service cannot be
    /// reached; any error the service reports, mapped onto [`CryptoError`].
    fn call(&self, endpoint: &str, request: &SigningRequest) -> CryptoResult<serde_json::Value>;
}

#[derive(Deserialize)]
struct SignResponse {
    sig: String,
}

#[derive(Deserialize)]
struct VerifyResponse {
    verified: bool,
}

#[derive(Deserialize)]
struct DeleteResponse {
    deleted: bool,
}

/// Provider backed by a remote signing service
///
/// HMAC algorithms are computed locally: the shared secret never leaves the
/// process.
#[derive(Clone)]
pub struct RemoteCryptoProvider {
    endpoint: String,
    transport: Arc<dyn SigningTransport>,
}

impl RemoteCryptoProvider {
    /// Provider talking to `endpoint` over `transport`
    pub fn new(endpoint: impl Into<String>, transport: Arc<dyn SigningTransport>) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    /// Service endpoint
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn call<T: for<'de> Deserialize<'de>>(&self, request: &SigningRequest) -> CryptoResult<T> {
        debug!(endpoint = %self.endpoint, operation = request.operation(), "remote signing call");
        let response = self.transport.call(&self.endpoint, request)?;
        serde_json::from_value(response).map_err(|e| {
            CryptoError::unavailable(format!(
                "malformed {} response from {}: {e}",
                request.operation(),
                self.endpoint
            ))
        })
    }
}

impl std::fmt::Debug for RemoteCryptoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteCryptoProvider")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

fn required_kid(key_id: Option<&str>, algorithm: SignatureAlgorithm) -> CryptoResult<String> {
    key_id
        .filter(|kid| !kid.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CryptoError::structural(format!("{algorithm} requires a key id")))
}

impl CryptoProvider for RemoteCryptoProvider {
    fn generate_key(
        &self,
        algorithm: SignatureAlgorithm,
        expiration: DateTime<Utc>,
    ) -> CryptoResult<JsonWebKey> {
        if !algorithm.is_asymmetric() {
            return Err(CryptoError::unsupported(format!(
                "{algorithm} keys are shared secrets and cannot be generated"
            )));
        }
        let key: JsonWebKey = self.call(&SigningRequest::GenerateKey {
            algorithm,
            expiration,
        })?;
        key.validate()?;
        if key.alg != algorithm {
            return Err(CryptoError::unavailable(format!(
                "{} returned a {} key for {algorithm}",
                self.endpoint, key.alg
            )));
        }
        Ok(key)
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
        let response: SignResponse = self.call(&SigningRequest::Sign {
            signing_input: signing_input.to_string(),
            key_id: required_kid(key_id, algorithm)?,
            algorithm,
        })?;
        Ok(response.sig)
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
        let key_id = required_kid(key_id, algorithm)?;
        let jwks_request_param = key_set
            .get(&key_id)
            .map(KeyRequestDescriptor::from_key)
            .transpose()?;

        let response: VerifyResponse = self.call(&SigningRequest::VerifySignature {
            signing_input: signing_input.to_string(),
            signature: signature.to_string(),
            key_id,
            algorithm,
            jwks_request_param,
        })?;
        Ok(response.verified)
    }

    fn delete_key(&self, key_id: &str) -> CryptoResult<bool> {
        let response: DeleteResponse = self.call(&SigningRequest::DeleteKey {
            key_id: key_id.to_string(),
        })?;
        Ok(response.deleted)
    }

    fn jwks(&self, key_set: &JsonWebKeySet) -> CryptoResult<JsonWebKeySet> {
        self.call(&SigningRequest::Jwks {
            jwks_request_param: KeyRequestDescriptor::from_key_set(key_set),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Unreachable;

    impl SigningTransport for Unreachable {
        fn call(&self, endpoint: &str, _: &SigningRequest) -> CryptoResult<serde_json::Value> {
            Err(CryptoError::unavailable(format!("{endpoint} refused connection")))
        }
    }

    struct Canned(serde_json::Value);

    impl SigningTransport for Canned {
        fn call(&self, _: &str, _: &SigningRequest) -> CryptoResult<serde_json::Value> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn request_wire_shape() {
        let request = SigningRequest::DeleteKey {
            key_id: "k1".into(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"operation": "deleteKey", "keyId": "k1"})
        );

        let request = SigningRequest::Jwks {
            jwks_request_param: KeyRequestDescriptor::from_key_set(&JsonWebKeySet::new()),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"operation": "jwks", "jwksRequestParam": {"keyRequestParams": []}})
        );
    }

    #[test]
    fn unreachable_service_is_unavailable() {
        let provider = RemoteCryptoProvider::new("https://signer", Arc::new(Unreachable));
        let result = provider.delete_key("k1");
        assert!(matches!(result, Err(CryptoError::ProviderUnavailable(_))));
    }

    #[test]
    fn malformed_response_is_unavailable() {
        let provider = RemoteCryptoProvider::new("https://signer", Arc::new(Canned(json!([]))));
        let result = provider.sign("a.b", Some("k"), None, SignatureAlgorithm::Rs256);
        assert!(matches!(result, Err(CryptoError::ProviderUnavailable(_))));
    }

    #[test]
    fn hmac_stays_local() {
        let provider = RemoteCryptoProvider::new("https://signer", Arc::new(Unreachable));
        let sig = provider
            .sign("a.b", None, Some("secret"), SignatureAlgorithm::Hs256)
            .unwrap();
        let ok = provider
            .verify_signature(
                "a.b",
                &sig,
                None,
                &JsonWebKeySet::new(),
                Some("secret"),
                SignatureAlgorithm::Hs256,
            )
            .unwrap();
        assert!(ok);
    }
}
