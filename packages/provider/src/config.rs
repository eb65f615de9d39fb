//! Rotation and provider-selection configuration

use crate::error::{CryptoError, CryptoResult};
use crate::signing::MIN_RSA_KEY_BITS;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Failure to load a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid configuration JSON
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The values are out of range
    #[error("invalid config: {0}")]
    Invalid(#[from] CryptoError),
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignetConfig {
    /// Key rotation cadence
    #[serde(default)]
    pub rotation: RotationConfig,
    /// Which backend holds the signing keys
    #[serde(default)]
    pub provider: ProviderConfig,
}

impl SignetConfig {
    /// Parse and validate a JSON document
    ///
    /// # Errors
    /// [`ConfigError::Parse`] on malformed JSON, [`ConfigError::Invalid`] on
    /// out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    ///
    /// # Errors
    /// As [`SignetConfig::from_json_str`], plus [`ConfigError::Io`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), backend = config.provider.backend(), "loaded config");
        Ok(config)
    }

    /// Check every section
    ///
    /// # Errors
    /// [`CryptoError::Structural`] naming the offending value.
    pub fn validate(&self) -> CryptoResult<()> {
        self.rotation.validate()?;
        self.provider.validate()
    }
}

/// Inputs to the expiration shared by one rotation batch
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Hours between rotations
    #[serde(default = "default_rotation_interval_hours")]
    pub rotation_interval_hours: i64,
    /// Lifetime of issued identity tokens
    #[serde(default = "default_token_lifetime_seconds")]
    pub token_lifetime_seconds: i64,
}

fn default_rotation_interval_hours() -> i64 {
    48
}

fn default_token_lifetime_seconds() -> i64 {
    3600
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            rotation_interval_hours: default_rotation_interval_hours(),
            token_lifetime_seconds: default_token_lifetime_seconds(),
        }
    }
}

impl RotationConfig {
    /// Rotation config from raw values
    #[must_use]
    pub const fn new(rotation_interval_hours: i64, token_lifetime_seconds: i64) -> Self {
        Self {
            rotation_interval_hours,
            token_lifetime_seconds,
        }
    }

    /// Reject negative or overflowing values
    ///
    /// # Errors
    /// [`CryptoError::Structural`].
    pub fn validate(&self) -> CryptoResult<()> {
        if self.rotation_interval_hours < 0 {
            return Err(CryptoError::structural(format!(
                "rotation_interval_hours must not be negative, got {}",
                self.rotation_interval_hours
            )));
        }
        if self.token_lifetime_seconds < 0 {
            return Err(CryptoError::structural(format!(
                "token_lifetime_seconds must not be negative, got {}",
                self.token_lifetime_seconds
            )));
        }
        self.key_lifetime().map(|_| ())
    }

    /// Rotation interval plus token lifetime
    ///
    /// # Errors
    /// [`CryptoError::Structural`] when the sum does not fit a duration.
    pub fn key_lifetime(&self) -> CryptoResult<Duration> {
        let out_of_range = || CryptoError::structural("key lifetime out of range");
        let hours = Duration::try_hours(self.rotation_interval_hours).ok_or_else(out_of_range)?;
        let seconds = Duration::try_seconds(self.token_lifetime_seconds).ok_or_else(out_of_range)?;
        hours.checked_add(&seconds).ok_or_else(out_of_range)
    }
}

/// Provider selection passed to the factory
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// In-process keystore
    Software {
        /// RSA modulus size
        #[serde(default = "default_rsa_key_bits")]
        rsa_key_bits: usize,
    },
    /// Remote signing service
    Remote {
        /// Service address handed to the transport
        endpoint: String,
    },
    /// Hardware security module
    Hardware {
        /// Module slot
        slot: u32,
    },
}

fn default_rsa_key_bits() -> usize {
    MIN_RSA_KEY_BITS
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::Software {
            rsa_key_bits: default_rsa_key_bits(),
        }
    }
}

impl ProviderConfig {
    /// Backend name as written in configuration
    #[must_use]
    pub const fn backend(&self) -> &'static str {
        match self {
            Self::Software { .. } => "software",
            Self::Remote { .. } => "remote",
            Self::Hardware { .. } => "hardware",
        }
    }

    fn validate(&self) -> CryptoResult<()> {
        match self {
            Self::Software { rsa_key_bits } if *rsa_key_bits < MIN_RSA_KEY_BITS => {
                Err(CryptoError::structural(format!(
                    "rsa_key_bits must be at least {MIN_RSA_KEY_BITS}, got {rsa_key_bits}"
                )))
            }
            Self::Remote { endpoint } if endpoint.trim().is_empty() => {
                Err(CryptoError::structural("remote endpoint must not be empty"))
            }
            _ => Ok(()),
        }
    }
}
