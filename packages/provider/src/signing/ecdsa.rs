//! ECDSA over NIST curves (ES256, ES384, ES512)
//!
//! Signatures use the fixed-width JOSE encoding `r || s`, not DER.

use crate::error::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use signet_jwk::{EllipticCurve, KeyMaterial, base64url_decode};

/// Private key for one of the supported curves
pub(crate) enum EcSigningKey {
    P256(p256::ecdsa::SigningKey),
    P384(p384::ecdsa::SigningKey),
    P521(p521::ecdsa::SigningKey),
}

/// Public key for one of the supported curves
pub(crate) enum EcVerifyingKey {
    P256(p256::ecdsa::VerifyingKey),
    P384(p384::ecdsa::VerifyingKey),
    P521(p521::ecdsa::VerifyingKey),
}

fn coordinates(curve: EllipticCurve, sec1: &[u8]) -> CryptoResult<KeyMaterial> {
    let len = curve.coordinate_len();
    // Uncompressed SEC1 point: 0x04 || x || y
    if sec1.len() != 1 + 2 * len || sec1[0] != 0x04 {
        return Err(CryptoError::invalid_key(format!(
            "unexpected {curve} point encoding"
        )));
    }
    Ok(KeyMaterial::ec(curve, &sec1[1..=len], &sec1[1 + len..]))
}

fn off_curve(curve: EllipticCurve) -> CryptoError {
    CryptoError::invalid_key(format!("{curve} point is not on the curve"))
}

fn signing_failed(e: impl std::fmt::Display) -> CryptoError {
    CryptoError::Signing(format!("ECDSA signing failed: {e}"))
}

impl EcSigningKey {
    pub(crate) fn generate(curve: EllipticCurve) -> Self {
        match curve {
            EllipticCurve::P256 => Self::P256(p256::ecdsa::SigningKey::random(&mut OsRng)),
            EllipticCurve::P384 => Self::P384(p384::ecdsa::SigningKey::random(&mut OsRng)),
            EllipticCurve::P521 => Self::P521(p521::ecdsa::SigningKey::random(&mut OsRng)),
        }
    }

    pub(crate) const fn curve(&self) -> EllipticCurve {
        match self {
            Self::P256(_) => EllipticCurve::P256,
            Self::P384(_) => EllipticCurve::P384,
            Self::P521(_) => EllipticCurve::P521,
        }
    }

    pub(crate) fn public_material(&self) -> CryptoResult<KeyMaterial> {
        match self {
            Self::P256(key) => {
                let point = key.verifying_key().to_encoded_point(false);
                coordinates(EllipticCurve::P256, point.as_bytes())
            }
            Self::P384(key) => {
                let point = key.verifying_key().to_encoded_point(false);
                coordinates(EllipticCurve::P384, point.as_bytes())
            }
            Self::P521(key) => {
                let point = p521::ecdsa::VerifyingKey::from(key).to_encoded_point(false);
                coordinates(EllipticCurve::P521, point.as_bytes())
            }
        }
    }

    pub(crate) fn sign(&self, message: &str) -> CryptoResult<Vec<u8>> {
        let message = message.as_bytes();
        match self {
            Self::P256(key) => {
                use p256::ecdsa::signature::Signer;
                let signature: p256::ecdsa::Signature =
                    key.try_sign(message).map_err(signing_failed)?;
                Ok(signature.to_bytes().to_vec())
            }
            Self::P384(key) => {
                use p384::ecdsa::signature::Signer;
                let signature: p384::ecdsa::Signature =
                    key.try_sign(message).map_err(signing_failed)?;
                Ok(signature.to_bytes().to_vec())
            }
            Self::P521(key) => {
                use p521::ecdsa::signature::Signer;
                let signature: p521::ecdsa::Signature =
                    key.try_sign(message).map_err(signing_failed)?;
                Ok(signature.to_bytes().to_vec())
            }
        }
    }
}

impl EcVerifyingKey {
    /// Rebuild a public key from JWK coordinates
    pub(crate) fn from_coordinates(curve: EllipticCurve, x: &str, y: &str) -> CryptoResult<Self> {
        let x = base64url_decode(x).map_err(|e| CryptoError::invalid_key(e.to_string()))?;
        let y = base64url_decode(y).map_err(|e| CryptoError::invalid_key(e.to_string()))?;
        let len = curve.coordinate_len();
        if x.len() != len || y.len() != len {
            return Err(CryptoError::invalid_key(format!(
                "{curve} coordinates must be {len} bytes"
            )));
        }

        let mut sec1 = Vec::with_capacity(1 + 2 * len);
        sec1.push(0x04);
        sec1.extend_from_slice(&x);
        sec1.extend_from_slice(&y);

        Ok(match curve {
            EllipticCurve::P256 => {
                let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                    .map_err(|_| off_curve(curve))?;
                Self::P256(key)
            }
            EllipticCurve::P384 => {
                let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                    .map_err(|_| off_curve(curve))?;
                Self::P384(key)
            }
            EllipticCurve::P521 => {
                let key = p521::ecdsa::VerifyingKey::from_sec1_bytes(&sec1)
                    .map_err(|_| off_curve(curve))?;
                Self::P521(key)
            }
        })
    }

    pub(crate) const fn curve(&self) -> EllipticCurve {
        match self {
            Self::P256(_) => EllipticCurve::P256,
            Self::P384(_) => EllipticCurve::P384,
            Self::P521(_) => EllipticCurve::P521,
        }
    }

    /// A signature of the wrong length or with out-of-range scalars is a mismatch
    pub(crate) fn verify(&self, message: &str, signature: &[u8]) -> bool {
        let message = message.as_bytes();
        match self {
            Self::P256(key) => {
                use p256::ecdsa::signature::Verifier;
                p256::ecdsa::Signature::from_slice(signature)
                    .is_ok_and(|sig| key.verify(message, &sig).is_ok())
            }
            Self::P384(key) => {
                use p384::ecdsa::signature::Verifier;
                p384::ecdsa::Signature::from_slice(signature)
                    .is_ok_and(|sig| key.verify(message, &sig).is_ok())
            }
            Self::P521(key) => {
                use p521::ecdsa::signature::Verifier;
                p521::ecdsa::Signature::from_slice(signature)
                    .is_ok_and(|sig| key.verify(message, &sig).is_ok())
            }
        }
    }
}
