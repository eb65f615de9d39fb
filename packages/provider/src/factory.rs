//! Builds the configured provider

use crate::backend::{RemoteCryptoProvider, SigningTransport, SoftwareKeyStore};
use crate::config::ProviderConfig;
use crate::error::{CryptoError, CryptoResult};
use crate::provider::CryptoProvider;
use std::sync::Arc;
use tracing::info;

/// Resolves a [`ProviderConfig`] to a provider instance
///
/// The factory is passed around explicitly; there is no process-wide
/// provider.
#[derive(Clone, Default)]
pub struct ProviderFactory {
    transport: Option<Arc<dyn SigningTransport>>,
}

impl ProviderFactory {
    /// Factory able to build in-process backends only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `transport` for remote backends
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn SigningTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the provider named by `config`
    ///
    /// # Errors
    /// [`CryptoError::ProviderUnavailable`] for hardware modules and for
    /// remote backends without a transport; [`CryptoError::Structural`] for
    /// invalid software settings.
    pub fn create(&self, config: &ProviderConfig) -> CryptoResult<Arc<dyn CryptoProvider>> {
        let provider: Arc<dyn CryptoProvider> = match config {
            ProviderConfig::Software { rsa_key_bits } => {
                Arc::new(SoftwareKeyStore::new(*rsa_key_bits)?)
            }
            ProviderConfig::Remote { endpoint } => {
                let transport = self.transport.clone().ok_or_else(|| {
                    CryptoError::unavailable(format!("no transport configured for {endpoint}"))
                })?;
                Arc::new(RemoteCryptoProvider::new(endpoint.clone(), transport))
            }
            ProviderConfig::Hardware { slot } => {
                return Err(CryptoError::unavailable(format!(
                    "hardware module slot {slot}: no module driver available"
                )));
            }
        };
        info!(backend = config.backend(), "crypto provider ready");
        Ok(provider)
    }
}

impl std::fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SigningRequest;

    struct Null;

    impl SigningTransport for Null {
        fn call(&self, _: &str, _: &SigningRequest) -> CryptoResult<serde_json::Value> {
            Ok(serde_json::json!({ "deleted": false }))
        }
    }

    #[test]
    fn hardware_is_unavailable() {
        let result = ProviderFactory::new().create(&ProviderConfig::Hardware { slot: 0 });
        assert!(matches!(result, Err(CryptoError::ProviderUnavailable(_))));
    }

    #[test]
    fn remote_needs_transport() {
        let config = ProviderConfig::Remote {
            endpoint: "https://signer".into(),
        };
        assert!(matches!(
            ProviderFactory::new().create(&config),
            Err(CryptoError::ProviderUnavailable(_))
        ));

        let provider = ProviderFactory::new()
            .with_transport(Arc::new(Null))
            .create(&config)
            .unwrap();
        assert!(!provider.delete_key("k").unwrap());
    }

    #[test]
    fn software_default() {
        let provider = ProviderFactory::new()
            .create(&ProviderConfig::default())
            .unwrap();
        assert!(!provider.delete_key("unknown").unwrap());
    }
}
