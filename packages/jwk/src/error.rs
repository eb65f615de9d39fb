//! Error types for the JWK wire model

use thiserror::Error;

/// Errors raised while reading or building key documents
#[derive(Debug, Error)]
pub enum JwkError {
    /// A required field is missing or has the wrong shape
    #[error("Structural error: {0}")]
    Structural(String),

    /// The algorithm name is not part of the catalog
    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl JwkError {
    /// Create a structural error
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Create a structural error for a missing required field
    pub fn missing_field(field: &str) -> Self {
        Self::Structural(format!("missing required field `{field}`"))
    }
}

/// Result type for JWK operations
pub type JwkResult<T> = Result<T, JwkError>;
