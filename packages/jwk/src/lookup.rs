//! Key identifier lookup by algorithm

use crate::algorithm::SignatureAlgorithm;
use crate::jwk::JsonWebKeySet;

/// Kid of the first key in set order bound to `algorithm`.
///
/// Returns `None` when no key matches. Key sets stay small (one active key per
/// family plus retained rotated keys), so a linear scan is enough.
#[must_use]
pub fn key_id<'a>(key_set: &'a JsonWebKeySet, algorithm: SignatureAlgorithm) -> Option<&'a str> {
    key_set
        .iter()
        .find(|key| key.alg.name() == algorithm.name())
        .map(|key| key.kid.as_str())
}
