//! Signing primitives shared by in-process backends
//!
//! Split per family the same way the algorithms are: RSA, ECDSA and HMAC.
//! [`PrivateKey`] and [`PublicKey`] dispatch on the algorithm and refuse a
//! key from another family or curve.

mod ecdsa;
mod hmac;
mod rsa;

pub use self::rsa::MIN_RSA_KEY_BITS;

use crate::error::{CryptoError, CryptoResult};
use ::rsa::{RsaPrivateKey, RsaPublicKey};
use self::ecdsa::{EcSigningKey, EcVerifyingKey};
use signet_jwk::{
    AlgorithmFamily, JsonWebKey, KeyMaterial, SignatureAlgorithm, base64url_decode,
    base64url_encode,
};

fn wrong_key(kid: &str, algorithm: SignatureAlgorithm) -> CryptoError {
    CryptoError::unsupported(format!("key `{kid}` cannot be used with {algorithm}"))
}

/// Private half of an asymmetric key pair
pub(crate) enum PrivateKey {
    Rsa(RsaPrivateKey),
    Ec(EcSigningKey),
}

impl PrivateKey {
    /// Generate a key pair for `algorithm`
    pub(crate) fn generate(algorithm: SignatureAlgorithm, rsa_bits: usize) -> CryptoResult<Self> {
        match (algorithm.family(), algorithm.curve()) {
            (AlgorithmFamily::Rsa, _) => Ok(Self::Rsa(rsa::generate(rsa_bits)?)),
            (AlgorithmFamily::Ec, Some(curve)) => Ok(Self::Ec(EcSigningKey::generate(curve))),
            _ => Err(CryptoError::unsupported(format!(
                "{algorithm} keys are shared secrets and cannot be generated"
            ))),
        }
    }

    /// Public family fields for the key document
    pub(crate) fn public_material(&self) -> CryptoResult<KeyMaterial> {
        match self {
            Self::Rsa(key) => Ok(rsa::public_material(key)),
            Self::Ec(key) => key.public_material(),
        }
    }

    /// Sign and return the base64url signature
    pub(crate) fn sign(
        &self,
        kid: &str,
        algorithm: SignatureAlgorithm,
        signing_input: &str,
    ) -> CryptoResult<String> {
        let signature = match self {
            Self::Rsa(key) if algorithm.family() == AlgorithmFamily::Rsa => {
                rsa::sign(key, algorithm.hash(), signing_input)?
            }
            Self::Ec(key) if algorithm.curve() == Some(key.curve()) => key.sign(signing_input)?,
            _ => return Err(wrong_key(kid, algorithm)),
        };
        Ok(base64url_encode(&signature))
    }
}

/// Public key rebuilt from a key document
pub(crate) enum PublicKey {
    Rsa(RsaPublicKey),
    Ec(EcVerifyingKey),
}

impl PublicKey {
    pub(crate) fn from_jwk(key: &JsonWebKey) -> CryptoResult<Self> {
        match &key.material {
            KeyMaterial::Rsa { n, e } => Ok(Self::Rsa(rsa::public_key(n, e)?)),
            KeyMaterial::Ec { crv, x, y } => {
                Ok(Self::Ec(EcVerifyingKey::from_coordinates(*crv, x, y)?))
            }
        }
    }

    /// Verify a base64url signature; undecodable signatures do not match
    pub(crate) fn verify(
        &self,
        kid: &str,
        algorithm: SignatureAlgorithm,
        signing_input: &str,
        signature: &str,
    ) -> CryptoResult<bool> {
        let compatible = match self {
            Self::Rsa(_) => algorithm.family() == AlgorithmFamily::Rsa,
            Self::Ec(key) => algorithm.curve() == Some(key.curve()),
        };
        if !compatible {
            return Err(wrong_key(kid, algorithm));
        }

        let Ok(signature) = base64url_decode(signature) else {
            return Ok(false);
        };
        Ok(match self {
            Self::Rsa(key) => rsa::verify(key, algorithm.hash(), signing_input, &signature),
            Self::Ec(key) => key.verify(signing_input, &signature),
        })
    }
}

fn shared_secret(secret: Option<&str>) -> CryptoResult<&[u8]> {
    match secret {
        Some(secret) if !secret.is_empty() => Ok(secret.as_bytes()),
        _ => Err(CryptoError::structural("HMAC algorithms require a shared secret")),
    }
}

/// HMAC over the signing input, base64url encoded
pub(crate) fn hmac_sign(
    algorithm: SignatureAlgorithm,
    secret: Option<&str>,
    signing_input: &str,
) -> CryptoResult<String> {
    let tag = hmac::sign(algorithm.hash(), shared_secret(secret)?, signing_input)?;
    Ok(base64url_encode(&tag))
}

/// Constant-time HMAC check of a base64url signature
pub(crate) fn hmac_verify(
    algorithm: SignatureAlgorithm,
    secret: Option<&str>,
    signing_input: &str,
    signature: &str,
) -> CryptoResult<bool> {
    let secret = shared_secret(secret)?;
    let Ok(signature) = base64url_decode(signature) else {
        return Ok(false);
    };
    hmac::verify(algorithm.hash(), secret, signing_input, &signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn document(algorithm: SignatureAlgorithm, key: &PrivateKey) -> JsonWebKey {
        JsonWebKey::new("t", algorithm, Utc::now(), key.public_material().unwrap()).unwrap()
    }

    #[test]
    fn ec_round_trip_for_every_curve() {
        for algorithm in [
            SignatureAlgorithm::Es256,
            SignatureAlgorithm::Es384,
            SignatureAlgorithm::Es512,
        ] {
            let key = PrivateKey::generate(algorithm, MIN_RSA_KEY_BITS).unwrap();
            let public = PublicKey::from_jwk(&document(algorithm, &key)).unwrap();
            let signature = key.sign("t", algorithm, "header.payload").unwrap();

            assert!(public.verify("t", algorithm, "header.payload", &signature).unwrap());
            assert!(!public.verify("t", algorithm, "header.tampered", &signature).unwrap());
        }
    }

    #[test]
    fn es512_signature_is_fixed_width() {
        let key = PrivateKey::generate(SignatureAlgorithm::Es512, MIN_RSA_KEY_BITS).unwrap();
        let signature = key.sign("t", SignatureAlgorithm::Es512, "input").unwrap();
        assert_eq!(base64url_decode(&signature).unwrap().len(), 132);
    }

    #[test]
    fn p521_public_material_has_full_width_coordinates() {
        let key = PrivateKey::generate(SignatureAlgorithm::Es512, MIN_RSA_KEY_BITS).unwrap();
        let KeyMaterial::Ec { crv, x, y } = key.public_material().unwrap() else {
            panic!("ES512 key must carry EC material");
        };
        assert_eq!(crv, signet_jwk::EllipticCurve::P521);
        assert_eq!(base64url_decode(&x).unwrap().len(), 66);
        assert_eq!(base64url_decode(&y).unwrap().len(), 66);
    }

    #[test]
    fn curve_mismatch_is_refused() {
        let key = PrivateKey::generate(SignatureAlgorithm::Es256, MIN_RSA_KEY_BITS).unwrap();
        let result = key.sign("t", SignatureAlgorithm::Es384, "input");
        assert!(matches!(result, Err(CryptoError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn hmac_requires_secret() {
        let result = hmac_sign(SignatureAlgorithm::Hs256, Some(""), "input");
        assert!(matches!(result, Err(CryptoError::Structural(_))));
        let result = hmac_verify(SignatureAlgorithm::Hs256, None, "input", "AA");
        assert!(matches!(result, Err(CryptoError::Structural(_))));
    }

    #[test]
    fn hmac_round_trip_and_mismatch() {
        let secret = Some("client-secret");
        let tag = hmac_sign(SignatureAlgorithm::Hs384, secret, "a.b").unwrap();
        assert!(hmac_verify(SignatureAlgorithm::Hs384, secret, "a.b", &tag).unwrap());
        assert!(!hmac_verify(SignatureAlgorithm::Hs384, Some("other"), "a.b", &tag).unwrap());
        assert!(!hmac_verify(SignatureAlgorithm::Hs384, secret, "a.b", "!!not-base64").unwrap());
    }

    #[test]
    fn hmac_key_generation_is_unsupported() {
        let result = PrivateKey::generate(SignatureAlgorithm::Hs256, MIN_RSA_KEY_BITS);
        assert!(matches!(result, Err(CryptoError::UnsupportedAlgorithm(_))));
    }
}
