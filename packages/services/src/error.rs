//! Error types for the service layer

use thiserror::Error;

/// Errors raised by the cipher service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The master key has the wrong size or encoding
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Ciphertext is malformed or fails authentication
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
