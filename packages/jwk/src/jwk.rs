//! JSON Web Key and JSON Web Key Set documents
//!
//! A [`JsonWebKey`] carries exactly the public fields of its own family:
//! `n`/`e` for RSA, `crv`/`x`/`y` for EC. The family fields live in
//! [`KeyMaterial`], flattened into the document on the wire, so a key with
//! both sets of fields cannot be constructed.

use crate::algorithm::{AlgorithmFamily, EllipticCurve, SignatureAlgorithm};
use crate::error::{JwkError, JwkResult};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base64 URL-safe encoding without padding (RFC 7515)
#[must_use]
pub fn base64url_encode(input: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(input)
}

/// Base64 URL-safe decoding without padding (RFC 7515)
///
/// # Errors
/// Returns [`JwkError::Structural`] when the input is not valid base64url.
pub fn base64url_decode(input: &str) -> JwkResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(input)
        .map_err(|e| JwkError::structural(format!("invalid base64url value: {e}")))
}

/// JWK `kty` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    /// RSA key
    #[serde(rename = "RSA")]
    Rsa,
    /// Elliptic-curve key
    #[serde(rename = "EC")]
    Ec,
    /// Octet sequence (symmetric)
    #[serde(rename = "oct")]
    Oct,
}

impl KeyType {
    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
            Self::Ec => "EC",
            Self::Oct => "oct",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWK `use` parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum KeyUse {
    /// Signature
    #[default]
    #[serde(rename = "sig")]
    Sig,
    /// Encryption
    #[serde(rename = "enc")]
    Enc,
}

impl KeyUse {
    /// Wire value
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sig => "sig",
            Self::Enc => "enc",
        }
    }
}

impl fmt::Display for KeyUse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family-specific public parameters, base64url encoded big-endian values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyMaterial {
    /// RSA public key
    Rsa {
        /// Modulus
        n: String,
        /// Public exponent
        e: String,
    },
    /// EC public point
    Ec {
        /// Curve name
        crv: EllipticCurve,
        /// Affine x coordinate
        x: String,
        /// Affine y coordinate
        y: String,
    },
}

impl KeyMaterial {
    /// Build RSA material from raw big-endian modulus and exponent
    #[must_use]
    pub fn rsa(modulus: &[u8], exponent: &[u8]) -> Self {
        Self::Rsa {
            n: base64url_encode(modulus),
            e: base64url_encode(exponent),
        }
    }

    /// Build EC material from raw affine coordinates
    #[must_use]
    pub fn ec(curve: EllipticCurve, x: &[u8], y: &[u8]) -> Self {
        Self::Ec {
            crv: curve,
            x: base64url_encode(x),
            y: base64url_encode(y),
        }
    }

    /// Family the material belongs to
    #[must_use]
    pub const fn family(&self) -> AlgorithmFamily {
        match self {
            Self::Rsa { .. } => AlgorithmFamily::Rsa,
            Self::Ec { .. } => AlgorithmFamily::Ec,
        }
    }

    /// Curve of EC material
    #[must_use]
    pub const fn curve(&self) -> Option<EllipticCurve> {
        match self {
            Self::Ec { crv, .. } => Some(*crv),
            Self::Rsa { .. } => None,
        }
    }
}

/// A single public key document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key identifier
    pub kid: String,
    /// Key type
    pub kty: KeyType,
    /// Intended use
    #[serde(rename = "use")]
    pub key_use: KeyUse,
    /// Algorithm the key is bound to
    pub alg: SignatureAlgorithm,
    /// Expiration, epoch milliseconds on the wire
    ///
    /// Always set on generated keys. Documents from elsewhere may leave it
    /// out, in which case it is omitted again on output.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub exp: Option<DateTime<Utc>>,
    /// Family fields
    #[serde(flatten)]
    pub material: KeyMaterial,
}

impl JsonWebKey {
    /// Build a signing key document, deriving `kty` from the algorithm
    ///
    /// # Errors
    /// Returns [`JwkError::Structural`] when the material does not belong to
    /// the algorithm's family or curve.
    pub fn new(
        kid: impl Into<String>,
        alg: SignatureAlgorithm,
        exp: DateTime<Utc>,
        material: KeyMaterial,
    ) -> JwkResult<Self> {
        let key = Self {
            kid: kid.into(),
            kty: alg.key_type(),
            key_use: KeyUse::Sig,
            alg,
            exp: Some(exp),
            material,
        };
        key.validate()?;
        Ok(key)
    }

    /// Check that `kty`, `alg` and the family fields agree
    ///
    /// # Errors
    /// Returns [`JwkError::Structural`] describing the first disagreement.
    pub fn validate(&self) -> JwkResult<()> {
        if self.kid.is_empty() {
            return Err(JwkError::structural("empty `kid`"));
        }
        if self.material.family() != self.alg.family() {
            return Err(JwkError::structural(format!(
                "key `{}` carries {:?} fields but is bound to {}",
                self.kid,
                self.material.family(),
                self.alg
            )));
        }
        if self.kty != self.alg.key_type() {
            return Err(JwkError::structural(format!(
                "key `{}` has kty {} but algorithm {} requires {}",
                self.kid,
                self.kty,
                self.alg,
                self.alg.key_type()
            )));
        }
        if self.material.curve() != self.alg.curve() {
            return Err(JwkError::structural(format!(
                "key `{}` curve does not match {}",
                self.kid, self.alg
            )));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct RawKeySet {
    keys: Vec<JsonWebKey>,
}

/// Ordered key set with unique key identifiers
///
/// Serializes as `{"keys":[...]}`, including when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawKeySet")]
pub struct JsonWebKeySet {
    keys: Vec<JsonWebKey>,
}

impl TryFrom<RawKeySet> for JsonWebKeySet {
    type Error = JwkError;

    fn try_from(raw: RawKeySet) -> Result<Self, Self::Error> {
        Self::try_from(raw.keys)
    }
}

impl TryFrom<Vec<JsonWebKey>> for JsonWebKeySet {
    type Error = JwkError;

    fn try_from(keys: Vec<JsonWebKey>) -> Result<Self, Self::Error> {
        let mut set = Self::with_capacity(keys.len());
        for key in keys {
            key.validate()?;
            set.push(key)?;
        }
        Ok(set)
    }
}

impl JsonWebKeySet {
    /// Empty key set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty key set with room for `capacity` keys
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
        }
    }

    /// Append a key, keeping set order
    ///
    /// # Errors
    /// Returns [`JwkError::Structural`] if the kid is already present.
    pub fn push(&mut self, key: JsonWebKey) -> JwkResult<()> {
        if self.contains(&key.kid) {
            return Err(JwkError::structural(format!("duplicate kid `{}`", key.kid)));
        }
        self.keys.push(key);
        Ok(())
    }

    /// Keys in set order
    #[must_use]
    pub fn keys(&self) -> &[JsonWebKey] {
        &self.keys
    }

    /// Iterate keys in set order
    pub fn iter(&self) -> std::slice::Iter<'_, JsonWebKey> {
        self.keys.iter()
    }

    /// Number of keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// True when the set holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Key with the given identifier
    #[must_use]
    pub fn get(&self, kid: &str) -> Option<&JsonWebKey> {
        self.keys.iter().find(|key| key.kid == kid)
    }

    /// True if a key with the given identifier is present
    #[must_use]
    pub fn contains(&self, kid: &str) -> bool {
        self.get(kid).is_some()
    }

    /// Remove and return the key with the given identifier
    pub fn remove(&mut self, kid: &str) -> Option<JsonWebKey> {
        let index = self.keys.iter().position(|key| key.kid == kid)?;
        Some(self.keys.remove(index))
    }

    /// Parse the canonical `{"keys":[...]}` document
    ///
    /// # Errors
    /// Fails on malformed JSON, inconsistent keys or duplicate kids.
    pub fn from_json(json: &str) -> JwkResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the canonical `{"keys":[...]}` document
    ///
    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_json(&self) -> JwkResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Canonical document as a JSON value
    ///
    /// # Errors
    /// Fails only if serialization fails.
    pub fn to_value(&self) -> JwkResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl<'a> IntoIterator for &'a JsonWebKeySet {
    type Item = &'a JsonWebKey;
    type IntoIter = std::slice::Iter<'a, JsonWebKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

impl IntoIterator for JsonWebKeySet {
    type Item = JsonWebKey;
    type IntoIter = std::vec::IntoIter<JsonWebKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn expiry() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn rsa_key(kid: &str) -> JsonWebKey {
        JsonWebKey::new(
            kid,
            SignatureAlgorithm::Rs256,
            expiry(),
            KeyMaterial::rsa(&[0xc3, 0x5a], &[1, 0, 1]),
        )
        .unwrap()
    }

    #[test]
    fn rsa_key_serializes_only_rsa_fields() {
        let value = serde_json::to_value(rsa_key("k1")).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["kty"], "RSA");
        assert_eq!(obj["use"], "sig");
        assert_eq!(obj["alg"], "RS256");
        assert_eq!(obj["e"], "AQAB");
        assert_eq!(obj["exp"], 1_700_000_000_000_i64);
        assert!(!obj.contains_key("crv"));
        assert!(!obj.contains_key("x"));
        assert!(!obj.contains_key("y"));
    }

    #[test]
    fn ec_key_serializes_only_ec_fields() {
        let key = JsonWebKey::new(
            "k2",
            SignatureAlgorithm::Es384,
            expiry(),
            KeyMaterial::ec(EllipticCurve::P384, &[1; 48], &[2; 48]),
        )
        .unwrap();
        let value = serde_json::to_value(&key).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["kty"], "EC");
        assert_eq!(obj["crv"], "P-384");
        assert!(!obj.contains_key("n"));
        assert!(!obj.contains_key("e"));

        let back: JsonWebKey = serde_json::from_value(value).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn mismatched_family_is_rejected() {
        let result = JsonWebKey::new(
            "k3",
            SignatureAlgorithm::Es256,
            expiry(),
            KeyMaterial::rsa(&[1], &[3]),
        );
        assert!(matches!(result, Err(JwkError::Structural(_))));
    }

    #[test]
    fn mismatched_curve_is_rejected() {
        let result = JsonWebKey::new(
            "k4",
            SignatureAlgorithm::Es256,
            expiry(),
            KeyMaterial::ec(EllipticCurve::P384, &[1; 48], &[2; 48]),
        );
        assert!(matches!(result, Err(JwkError::Structural(_))));
    }

    #[test]
    fn duplicate_kid_is_rejected() {
        let mut set = JsonWebKeySet::new();
        set.push(rsa_key("dup")).unwrap();
        assert!(matches!(set.push(rsa_key("dup")), Err(JwkError::Structural(_))));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_set_keeps_canonical_shape() {
        let json = JsonWebKeySet::new().to_json().unwrap();
        assert_eq!(json, r#"{"keys":[]}"#);
        assert!(JsonWebKeySet::from_json(&json).unwrap().is_empty());
    }

    #[test]
    fn duplicate_kid_in_document_is_rejected() {
        let one = serde_json::to_value(rsa_key("a")).unwrap();
        let doc = serde_json::json!({ "keys": [one.clone(), one] }).to_string();
        assert!(JsonWebKeySet::from_json(&doc).is_err());
    }

    #[test]
    fn remove_preserves_order() {
        let mut set = JsonWebKeySet::new();
        for kid in ["a", "b", "c"] {
            set.push(rsa_key(kid)).unwrap();
        }
        assert!(set.remove("b").is_some());
        assert!(set.remove("b").is_none());
        let kids: Vec<_> = set.iter().map(|k| k.kid.as_str()).collect();
        assert_eq!(kids, ["a", "c"]);
    }
}
