//! Key request descriptors for delegated signing backends
//!
//! A remote signing service addresses keys through a `keyRequestParams`
//! list rather than full key documents. Two builders exist and they differ on
//! purpose:
//!
//! - [`KeyRequestDescriptor::from_document`] maps one key document and carries
//!   every family field, defaulting absent ones to `""`.
//! - [`KeyRequestDescriptor::from_key_set`] maps a whole set and carries only
//!   `alg`, `kid`, `use`, `kty` and `crv`; `n`, `e`, `x` and `y` are left out.
//!
//! Backends already depend on both shapes, so they are kept separate.

use crate::error::{JwkError, JwkResult};
use crate::jwk::{JsonWebKey, JsonWebKeySet, KeyMaterial};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One key reference inside a [`KeyRequestDescriptor`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRequestParam {
    /// Algorithm name
    pub alg: String,
    /// Key identifier
    pub kid: String,
    /// Key use
    #[serde(rename = "use")]
    pub key_use: String,
    /// Key type
    pub kty: String,
    /// RSA modulus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA exponent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// Curve name, empty for non-EC keys
    #[serde(default)]
    pub crv: String,
    /// EC x coordinate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// EC y coordinate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

/// Wire document `{"keyRequestParams":[...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyRequestDescriptor {
    /// Referenced keys
    pub key_request_params: Vec<KeyRequestParam>,
}

fn required_str(doc: &Map<String, Value>, field: &str) -> JwkResult<String> {
    match doc.get(field) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(Value::Null) | None => Err(JwkError::missing_field(field)),
        Some(other) => Err(JwkError::structural(format!(
            "field `{field}` must be a string, got {other}"
        ))),
    }
}

/// Text of an optional field: `""` when absent or null, the JSON text of any
/// non-string value.
fn optional_str(doc: &Map<String, Value>, field: &str) -> String {
    match doc.get(field) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

impl KeyRequestDescriptor {
    /// Map a single key document.
    ///
    /// `alg`, `kid`, `use` and `kty` are required. `n`, `e`, `crv`, `x` and `y`
    /// are copied when present and set to `""` otherwise, never omitted. A
    /// non-string value is carried as its JSON text.
    ///
    /// # Errors
    /// Returns [`JwkError::Structural`] if the input is not an object or a
    /// required field is missing.
    pub fn from_document(document: &Value) -> JwkResult<Self> {
        let doc = document
            .as_object()
            .ok_or_else(|| JwkError::structural("key document must be a JSON object"))?;

        let param = KeyRequestParam {
            alg: required_str(doc, "alg")?,
            kid: required_str(doc, "kid")?,
            key_use: required_str(doc, "use")?,
            kty: required_str(doc, "kty")?,
            n: Some(optional_str(doc, "n")),
            e: Some(optional_str(doc, "e")),
            crv: optional_str(doc, "crv"),
            x: Some(optional_str(doc, "x")),
            y: Some(optional_str(doc, "y")),
        };

        Ok(Self {
            key_request_params: vec![param],
        })
    }

    /// Map a typed key through the single-document form
    ///
    /// # Errors
    /// Fails only if the key cannot be serialized.
    pub fn from_key(key: &JsonWebKey) -> JwkResult<Self> {
        Self::from_document(&serde_json::to_value(key)?)
    }

    /// Map every key of a set, carrying identifiers and curve only
    #[must_use]
    pub fn from_key_set(key_set: &JsonWebKeySet) -> Self {
        let key_request_params = key_set
            .iter()
            .map(|key| KeyRequestParam {
                alg: key.alg.name().to_string(),
                kid: key.kid.clone(),
                key_use: key.key_use.as_str().to_string(),
                kty: key.kty.as_str().to_string(),
                crv: match &key.material {
                    KeyMaterial::Ec { crv, .. } => crv.name().to_string(),
                    KeyMaterial::Rsa { .. } => String::new(),
                },
                ..KeyRequestParam::default()
            })
            .collect();

        Self { key_request_params }
    }

    /// Number of referenced keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.key_request_params.len()
    }

    /// True when no key is referenced
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key_request_params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rsa_document_gets_empty_ec_fields() {
        let doc = json!({
            "alg": "RS256", "kid": "k1", "use": "sig", "kty": "RSA",
            "n": "modulus", "e": "AQAB"
        });
        let descriptor = KeyRequestDescriptor::from_document(&doc).unwrap();
        let param = &descriptor.key_request_params[0];
        assert_eq!(param.n.as_deref(), Some("modulus"));
        assert_eq!(param.e.as_deref(), Some("AQAB"));
        assert_eq!(param.crv, "");
        assert_eq!(param.x.as_deref(), Some(""));
        assert_eq!(param.y.as_deref(), Some(""));

        let wire = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(wire["keyRequestParams"][0]["x"], "");
        assert_eq!(wire["keyRequestParams"][0]["crv"], "");
    }

    #[test]
    fn null_optional_field_becomes_empty_string() {
        let doc = json!({
            "alg": "ES256", "kid": "k2", "use": "sig", "kty": "EC",
            "crv": "P-256", "x": "xx", "y": null
        });
        let descriptor = KeyRequestDescriptor::from_document(&doc).unwrap();
        assert_eq!(descriptor.key_request_params[0].y.as_deref(), Some(""));
        assert_eq!(descriptor.key_request_params[0].n.as_deref(), Some(""));
    }

    #[test]
    fn non_string_optional_field_is_carried_as_json_text() {
        let doc = json!({
            "alg": "ES256", "kid": "k3", "use": "sig", "kty": "EC",
            "crv": 256, "x": { "a": 1 }, "y": true, "n": [1, 2]
        });
        let descriptor = KeyRequestDescriptor::from_document(&doc).unwrap();
        let param = &descriptor.key_request_params[0];
        assert_eq!(param.crv, "256");
        assert_eq!(param.x.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(param.y.as_deref(), Some("true"));
        assert_eq!(param.n.as_deref(), Some("[1,2]"));
        assert_eq!(param.e.as_deref(), Some(""));
    }

    #[test]
    fn missing_required_field_is_structural() {
        for field in ["alg", "kid", "use", "kty"] {
            let mut doc = json!({ "alg": "RS256", "kid": "k1", "use": "sig", "kty": "RSA" });
            doc.as_object_mut().unwrap().remove(field);
            let err = KeyRequestDescriptor::from_document(&doc).unwrap_err();
            assert!(matches!(err, JwkError::Structural(msg) if msg.contains(field)));
        }
    }

    #[test]
    fn non_object_document_is_structural() {
        let result = KeyRequestDescriptor::from_document(&json!(["RS256"]));
        assert!(matches!(result, Err(JwkError::Structural(_))));
    }
}
