//! Error handling for crypto providers

use signet_jwk::JwkError;
use thiserror::Error;

/// Errors raised by crypto providers and the rotation routine
///
/// A signature that does not match is not an error; verification reports it
/// as `Ok(false)`.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A required field is missing or malformed
    #[error("Structural error: {0}")]
    Structural(String),

    /// The backend cannot produce or consume this algorithm
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// No key with this identifier is known
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The key store or signing service cannot be reached
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Key material could not be decoded or used
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The signing primitive failed
    #[error("Signing error: {0}")]
    Signing(String),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Which side of a request an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The caller sent something unusable
    Client,
    /// The provider failed
    Server,
}

impl CryptoError {
    /// Create a structural error
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Create an unsupported algorithm error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(msg.into())
    }

    /// Create a key not found error
    pub fn key_not_found(kid: impl Into<String>) -> Self {
        Self::KeyNotFound(kid.into())
    }

    /// Create a provider unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Create an invalid key material error
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKeyMaterial(msg.into())
    }

    /// Classify the error for a user-visible response
    #[must_use]
    pub const fn fault(&self) -> Fault {
        match self {
            Self::Structural(_) | Self::UnsupportedAlgorithm(_) | Self::KeyNotFound(_) => {
                Fault::Client
            }
            Self::ProviderUnavailable(_)
            | Self::InvalidKeyMaterial(_)
            | Self::Signing(_)
            | Self::Serialization(_) => Fault::Server,
        }
    }
}

impl From<JwkError> for CryptoError {
    fn from(err: JwkError) -> Self {
        match err {
            JwkError::Structural(msg) => Self::Structural(msg),
            JwkError::UnknownAlgorithm(alg) => Self::UnsupportedAlgorithm(alg),
            JwkError::Serialization(e) => Self::Serialization(e),
        }
    }
}

/// Result type for provider operations
pub type CryptoResult<T> = Result<T, CryptoError>;
