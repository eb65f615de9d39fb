//! Signature algorithm catalog
//!
//! The set of algorithms is fixed at compile time. Each algorithm belongs to
//! one [`AlgorithmFamily`], which decides the key type it is published under
//! and the family fields its key documents carry.

use crate::error::JwkError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Algorithm family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmFamily {
    /// RSASSA-PKCS1-v1_5
    Rsa,
    /// ECDSA over a NIST curve
    Ec,
    /// HMAC with a shared secret
    Hmac,
}

/// Hash function paired with an algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

/// NIST curves used by the EC family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EllipticCurve {
    /// secp256r1
    #[serde(rename = "P-256")]
    P256,
    /// secp384r1
    #[serde(rename = "P-384")]
    P384,
    /// secp521r1
    #[serde(rename = "P-521")]
    P521,
}

impl EllipticCurve {
    /// JWK `crv` name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Length of one affine coordinate (and of `r`/`s`) in bytes
    #[must_use]
    pub const fn coordinate_len(self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// Parse a JWK `crv` name
    ///
    /// # Errors
    /// Returns [`JwkError::Structural`] for curves outside the catalog.
    pub fn from_name(name: &str) -> Result<Self, JwkError> {
        match name {
            "P-256" => Ok(Self::P256),
            "P-384" => Ok(Self::P384),
            "P-521" => Ok(Self::P521),
            other => Err(JwkError::structural(format!("unknown curve `{other}`"))),
        }
    }
}

impl fmt::Display for EllipticCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Supported signature algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureAlgorithm {
    /// RSASSA-PKCS1-v1_5 using SHA-256
    #[serde(rename = "RS256")]
    Rs256,
    /// RSASSA-PKCS1-v1_5 using SHA-384
    #[serde(rename = "RS384")]
    Rs384,
    /// RSASSA-PKCS1-v1_5 using SHA-512
    #[serde(rename = "RS512")]
    Rs512,
    /// ECDSA using P-256 and SHA-256
    #[serde(rename = "ES256")]
    Es256,
    /// ECDSA using P-384 and SHA-384
    #[serde(rename = "ES384")]
    Es384,
    /// ECDSA using P-521 and SHA-512
    #[serde(rename = "ES512")]
    Es512,
    /// HMAC using SHA-256
    #[serde(rename = "HS256")]
    Hs256,
    /// HMAC using SHA-384
    #[serde(rename = "HS384")]
    Hs384,
    /// HMAC using SHA-512
    #[serde(rename = "HS512")]
    Hs512,
}

impl SignatureAlgorithm {
    /// Algorithms generated by one rotation batch, in output order.
    ///
    /// HMAC algorithms are absent: their keys are shared secrets owned by
    /// clients, not by the key store.
    pub const ROTATION_ORDER: [SignatureAlgorithm; 6] = [
        Self::Rs256,
        Self::Rs384,
        Self::Rs512,
        Self::Es256,
        Self::Es384,
        Self::Es512,
    ];

    /// Every algorithm in the catalog
    pub const ALL: [SignatureAlgorithm; 9] = [
        Self::Rs256,
        Self::Rs384,
        Self::Rs512,
        Self::Es256,
        Self::Es384,
        Self::Es512,
        Self::Hs256,
        Self::Hs384,
        Self::Hs512,
    ];

    /// Canonical JWA name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Rs256 => "RS256",
            Self::Rs384 => "RS384",
            Self::Rs512 => "RS512",
            Self::Es256 => "ES256",
            Self::Es384 => "ES384",
            Self::Es512 => "ES512",
            Self::Hs256 => "HS256",
            Self::Hs384 => "HS384",
            Self::Hs512 => "HS512",
        }
    }

    /// Family this algorithm belongs to
    #[must_use]
    pub const fn family(self) -> AlgorithmFamily {
        match self {
            Self::Rs256 | Self::Rs384 | Self::Rs512 => AlgorithmFamily::Rsa,
            Self::Es256 | Self::Es384 | Self::Es512 => AlgorithmFamily::Ec,
            Self::Hs256 | Self::Hs384 | Self::Hs512 => AlgorithmFamily::Hmac,
        }
    }

    /// Hash function used over the signing input
    #[must_use]
    pub const fn hash(self) -> HashAlgorithm {
        match self {
            Self::Rs256 | Self::Es256 | Self::Hs256 => HashAlgorithm::Sha256,
            Self::Rs384 | Self::Es384 | Self::Hs384 => HashAlgorithm::Sha384,
            Self::Rs512 | Self::Es512 | Self::Hs512 => HashAlgorithm::Sha512,
        }
    }

    /// Curve for EC algorithms, `None` otherwise
    #[must_use]
    pub const fn curve(self) -> Option<EllipticCurve> {
        match self {
            Self::Es256 => Some(EllipticCurve::P256),
            Self::Es384 => Some(EllipticCurve::P384),
            Self::Es512 => Some(EllipticCurve::P521),
            _ => None,
        }
    }

    /// JWK key type the algorithm's keys are published under
    #[must_use]
    pub const fn key_type(self) -> crate::jwk::KeyType {
        match self.family() {
            AlgorithmFamily::Rsa => crate::jwk::KeyType::Rsa,
            AlgorithmFamily::Ec => crate::jwk::KeyType::Ec,
            AlgorithmFamily::Hmac => crate::jwk::KeyType::Oct,
        }
    }

    /// True for RSA and EC algorithms
    #[must_use]
    pub const fn is_asymmetric(self) -> bool {
        !matches!(self.family(), AlgorithmFamily::Hmac)
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = JwkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|alg| alg.name() == s)
            .ok_or_else(|| JwkError::UnknownAlgorithm(s.to_string()))
    }
}
