//! Bearer token extraction and grant resolution

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

const BEARER_PREFIX: &str = "Bearer ";

/// An authorization grant an access token was issued under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationGrant {
    /// Client the grant belongs to
    pub client_id: String,
    /// Directory entry of the client
    pub client_dn: String,
    /// Granted scopes
    pub scopes: Vec<String>,
    /// When the access token stops being valid
    pub expires_at: DateTime<Utc>,
}

impl AuthorizationGrant {
    /// True until `expires_at`
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Lookup of grants by access token
pub trait GrantStore: Send + Sync {
    /// Grant the token was issued under, if any
    fn grant_by_access_token(&self, token: &str) -> Option<AuthorizationGrant>;
}

/// Grants held in memory
#[derive(Debug, Default)]
pub struct InMemoryGrantStore {
    grants: DashMap<String, AuthorizationGrant>,
}

impl InMemoryGrantStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `grant` under `access_token`
    pub fn insert(&self, access_token: impl Into<String>, grant: AuthorizationGrant) {
        self.grants.insert(access_token.into(), grant);
    }

    /// Forget `access_token`; true if it was known
    pub fn revoke(&self, access_token: &str) -> bool {
        self.grants.remove(access_token).is_some()
    }
}

impl GrantStore for InMemoryGrantStore {
    fn grant_by_access_token(&self, token: &str) -> Option<AuthorizationGrant> {
        self.grants.get(token).map(|entry| entry.value().clone())
    }
}

/// Resolves `Authorization` header values to active grants
#[derive(Debug)]
pub struct BearerTokenService<S> {
    grants: S,
}

impl<S: GrantStore> BearerTokenService<S> {
    /// Service over `grants`
    pub const fn new(grants: S) -> Self {
        Self { grants }
    }

    /// Token following the case-sensitive `"Bearer "` prefix
    #[must_use]
    pub fn token_from_authorization<'a>(&self, authorization: Option<&'a str>) -> Option<&'a str> {
        authorization?.strip_prefix(BEARER_PREFIX)
    }

    /// Active grant for the bearer token in `authorization`
    #[must_use]
    pub fn authorization_grant(&self, authorization: Option<&str>) -> Option<AuthorizationGrant> {
        self.authorization_grant_at(authorization, Utc::now())
    }

    /// As [`BearerTokenService::authorization_grant`], evaluated at `now`
    #[must_use]
    pub fn authorization_grant_at(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> Option<AuthorizationGrant> {
        let token = self
            .token_from_authorization(authorization)
            .filter(|token| !token.trim().is_empty())?;
        let grant = self.grants.grant_by_access_token(token)?;
        if grant.is_active_at(now) {
            Some(grant)
        } else {
            debug!(client_id = %grant.client_id, "access token expired");
            None
        }
    }

    /// Client DN of the active grant, empty when there is none
    #[must_use]
    pub fn client_dn(&self, authorization: Option<&str>) -> String {
        self.authorization_grant(authorization)
            .map(|grant| grant.client_dn)
            .unwrap_or_default()
    }
}
