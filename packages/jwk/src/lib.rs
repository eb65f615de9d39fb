//! # Signet JWK
//!
//! Wire model shared by every signing backend:
//!
//! - **Algorithm catalog**: RS256/384/512, ES256/384/512 and HS256/384/512
//! - **Key documents**: JSON Web Keys that carry only their own family's fields
//! - **Key sets**: ordered, kid-unique, always `{"keys":[...]}` on the wire
//! - **Key lookup**: first kid bound to an algorithm
//! - **Key request descriptors**: the `keyRequestParams` shape sent to
//!   delegated signing services
//!
//! ```rust
//! use signet_jwk::{JsonWebKeySet, SignatureAlgorithm, key_id};
//!
//! let set = JsonWebKeySet::from_json(r#"{"keys":[]}"#).unwrap();
//! assert_eq!(key_id(&set, SignatureAlgorithm::Rs256), None);
//! ```

#![forbid(unsafe_code)]

pub mod algorithm;
pub mod error;
pub mod jwk;
pub mod lookup;
pub mod request_params;

pub use algorithm::{AlgorithmFamily, EllipticCurve, HashAlgorithm, SignatureAlgorithm};
pub use error::{JwkError, JwkResult};
pub use jwk::{
    JsonWebKey, JsonWebKeySet, KeyMaterial, KeyType, KeyUse, base64url_decode, base64url_encode,
};
pub use lookup::key_id;
pub use request_params::{KeyRequestDescriptor, KeyRequestParam};
