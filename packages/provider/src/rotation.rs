//! Batch key rotation
//!
//! One batch generates a key for every algorithm of
//! [`SignatureAlgorithm::ROTATION_ORDER`]. All keys share one expiration and
//! appear in that order. A failure for one algorithm is logged and recorded
//! in the report; it never aborts the batch.

use crate::config::RotationConfig;
use crate::error::{CryptoError, CryptoResult};
use crate::provider::CryptoProvider;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use signet_jwk::{JsonWebKey, JsonWebKeySet, SignatureAlgorithm};
use std::sync::Arc;
use tracing::{info, warn};

/// An algorithm that produced no key in a batch
#[derive(Debug)]
pub struct RotationFailure {
    /// Algorithm that failed
    pub algorithm: SignatureAlgorithm,
    /// Why it failed
    pub error: CryptoError,
}

/// Outcome of one rotation batch
#[derive(Debug)]
pub struct RotationReport {
    /// Expiration shared by every generated key
    pub expiration: DateTime<Utc>,
    /// Generated keys in rotation order
    pub key_set: JsonWebKeySet,
    /// Algorithms that were skipped
    pub failures: Vec<RotationFailure>,
}

impl RotationReport {
    /// True when every algorithm produced a key
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// New keys followed by the keys of `previous` still to be honored
    ///
    /// Previous keys stay published until they are deleted, so tokens signed
    /// before the rotation keep verifying. `provider` decides which of them
    /// still exist.
    ///
    /// # Errors
    /// Whatever [`CryptoProvider::jwks`] reports for `previous`.
    pub fn published(
        &self,
        provider: &dyn CryptoProvider,
        previous: &JsonWebKeySet,
    ) -> CryptoResult<JsonWebKeySet> {
        let retained = provider.jwks(previous)?;
        let keys: Vec<JsonWebKey> = self
            .key_set
            .iter()
            .chain(retained.iter().filter(|key| !self.key_set.contains(&key.kid)))
            .cloned()
            .collect();
        Ok(JsonWebKeySet::try_from(keys)?)
    }
}

/// Generates key sets with a fixed lifetime
#[derive(Debug, Clone, Copy)]
pub struct KeySetGenerator {
    lifetime: Duration,
}

impl KeySetGenerator {
    /// Generator for keys living one rotation interval plus one token lifetime
    ///
    /// # Errors
    /// [`CryptoError::Structural`] for negative or overflowing values.
    pub fn new(config: RotationConfig) -> CryptoResult<Self> {
        config.validate()?;
        Ok(Self {
            lifetime: config.key_lifetime()?,
        })
    }

    /// Key lifetime of every batch
    #[must_use]
    pub const fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Expiration for a batch started at `now`
    ///
    /// Truncated to whole milliseconds, the precision of `exp` on the wire.
    #[must_use]
    pub fn expiration_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .trunc_subsecs(3)
    }

    /// Rotate now
    pub fn rotate(&self, provider: &dyn CryptoProvider) -> RotationReport {
        self.rotate_at(provider, Utc::now())
    }

    /// Rotate as if started at `now`
    pub fn rotate_at(&self, provider: &dyn CryptoProvider, now: DateTime<Utc>) -> RotationReport {
        let expiration = self.expiration_at(now);
        let results = SignatureAlgorithm::ROTATION_ORDER
            .into_iter()
            .map(|algorithm| (algorithm, provider.generate_key(algorithm, expiration)));
        assemble(expiration, results)
    }

    /// Rotate now and return only the key set
    pub fn generate_jwks(&self, provider: &dyn CryptoProvider) -> JsonWebKeySet {
        self.rotate(provider).key_set
    }

    /// Rotate with every algorithm generated on tokio's blocking pool
    ///
    /// Results are collected in rotation order, whatever order the tasks
    /// finish in.
    pub async fn rotate_concurrent(&self, provider: Arc<dyn CryptoProvider>) -> RotationReport {
        let expiration = self.expiration_at(Utc::now());
        let handles: Vec<_> = SignatureAlgorithm::ROTATION_ORDER
            .into_iter()
            .map(|algorithm| {
                let provider = Arc::clone(&provider);
                let handle = tokio::task::spawn_blocking(move || {
                    provider.generate_key(algorithm, expiration)
                });
                (algorithm, handle)
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (algorithm, handle) in handles {
            let result = handle.await.unwrap_or_else(|e| {
                Err(CryptoError::unavailable(format!(
                    "key generation task failed: {e}"
                )))
            });
            results.push((algorithm, result));
        }
        assemble(expiration, results)
    }
}

fn assemble(
    expiration: DateTime<Utc>,
    results: impl IntoIterator<Item = (SignatureAlgorithm, CryptoResult<JsonWebKey>)>,
) -> RotationReport {
    let mut key_set = JsonWebKeySet::with_capacity(SignatureAlgorithm::ROTATION_ORDER.len());
    let mut failures = Vec::new();

    for (algorithm, result) in results {
        let outcome = result.and_then(|key| key_set.push(key).map_err(CryptoError::from));
        if let Err(error) = outcome {
            warn!(algorithm = %algorithm, error = %error, "key generation failed, skipping");
            failures.push(RotationFailure { algorithm, error });
        }
    }

    info!(
        generated = key_set.len(),
        failed = failures.len(),
        expiration = %expiration,
        "key rotation finished"
    );
    RotationReport {
        expiration,
        key_set,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SoftwareKeyStore;
    use chrono::TimeZone;

    #[test]
    fn expiration_adds_interval_and_token_lifetime() {
        let generator = KeySetGenerator::new(RotationConfig::new(1, 3600)).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            generator.expiration_at(start),
            Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn negative_config_is_rejected() {
        let result = KeySetGenerator::new(RotationConfig::new(0, -5));
        assert!(matches!(result, Err(CryptoError::Structural(_))));
    }

    #[test]
    fn published_keeps_previous_keys_after_new_ones() {
        let store = SoftwareKeyStore::default();
        let generator = KeySetGenerator::new(RotationConfig::default()).unwrap();
        let old = store.generate_key(SignatureAlgorithm::Es256, Utc::now()).unwrap();
        let previous = JsonWebKeySet::try_from(vec![old.clone()]).unwrap();

        let report = generator.rotate(&store);
        let published = report.published(&store, &previous).unwrap();
        assert_eq!(published.len(), report.key_set.len() + 1);
        assert_eq!(published.keys().last().map(|k| k.kid.as_str()), Some(old.kid.as_str()));
    }

    #[test]
    fn published_drops_previous_keys_already_deleted() {
        let store = SoftwareKeyStore::default();
        let generator = KeySetGenerator::new(RotationConfig::default()).unwrap();
        let kept = store.generate_key(SignatureAlgorithm::Rs256, Utc::now()).unwrap();
        let deleted = store.generate_key(SignatureAlgorithm::Es384, Utc::now()).unwrap();
        let previous = JsonWebKeySet::try_from(vec![kept.clone(), deleted.clone()]).unwrap();
        assert!(store.delete_key(&deleted.kid).unwrap());

        let report = generator.rotate(&store);
        let published = report.published(&store, &previous).unwrap();
        assert!(published.contains(&kept.kid));
        assert!(!published.contains(&deleted.kid));
        assert_eq!(published.len(), report.key_set.len() + 1);
    }

    #[test]
    fn published_does_not_repeat_a_kid_of_the_new_batch() {
        let store = SoftwareKeyStore::default();
        let generator = KeySetGenerator::new(RotationConfig::default()).unwrap();
        let report = generator.rotate(&store);

        let published = report.published(&store, &report.key_set).unwrap();
        assert_eq!(published, report.key_set);
    }

    #[test]
    fn duplicate_kid_from_backend_is_a_failure() {
        let expiration = Utc::now();
        let store = SoftwareKeyStore::default();
        let key = store.generate_key(SignatureAlgorithm::Es256, expiration).unwrap();
        let report = assemble(
            expiration,
            [
                (SignatureAlgorithm::Es256, Ok(key.clone())),
                (SignatureAlgorithm::Es384, Ok(key)),
            ],
        );
        assert_eq!(report.key_set.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].algorithm, SignatureAlgorithm::Es384);
    }
}
