//! # Signet Provider
//!
//! Signing keys for an OpenID Connect provider:
//!
//! - [`CryptoProvider`]: generate, sign, verify, delete and publish keys
//! - [`SoftwareKeyStore`] and [`RemoteCryptoProvider`] backends, chosen by
//!   [`ProviderFactory`] from a [`ProviderConfig`]
//! - [`KeySetGenerator`]: batch rotation across RS256..ES512 that tolerates
//!   per-algorithm failures
//!
//! ```rust,no_run
//! use signet_provider::{KeySetGenerator, ProviderFactory, SignetConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SignetConfig::load("signet.json")?;
//! let provider = ProviderFactory::new().create(&config.provider)?;
//! let report = KeySetGenerator::new(config.rotation)?.rotate(provider.as_ref());
//! println!("{}", report.key_set.to_json()?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod backend;
pub mod config;
pub mod error;
pub mod factory;
pub mod provider;
pub mod rotation;
mod signing;

pub use backend::{RemoteCryptoProvider, SigningRequest, SigningTransport, SoftwareKeyStore};
pub use config::{ConfigError, ProviderConfig, RotationConfig, SignetConfig};
pub use error::{CryptoError, CryptoResult, Fault};
pub use factory::ProviderFactory;
pub use provider::CryptoProvider;
pub use rotation::{KeySetGenerator, RotationFailure, RotationReport};
pub use signing::MIN_RSA_KEY_BITS;
