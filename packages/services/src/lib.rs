//! # Signet Services
//!
//! Collaborators of the signing core that do no signing themselves:
//!
//! - [`CipherService`] / [`AesGcmCipher`]: encryption of configuration
//!   secrets at rest
//! - [`BearerTokenService`]: `Authorization: Bearer` extraction and grant
//!   lookup

#![forbid(unsafe_code)]

pub mod cipher;
pub mod error;
pub mod token;

pub use cipher::{AesGcmCipher, CipherService};
pub use error::{ServiceError, ServiceResult};
pub use token::{AuthorizationGrant, BearerTokenService, GrantStore, InMemoryGrantStore};
