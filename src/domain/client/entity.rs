// src/domain/client/entity.rs
use crate::domain::client::value_objects::{ClientId, RedirectUri};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::user::PasswordHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub secret_hash: Option<PasswordHash>,
    pub confidential: bool,
    pub redirect_uris: Vec<RedirectUri>,
    pub created_at: DateTime<Utc>,
}

impl Client {
    /// A client that authenticates with a secret on every credentialed request.
    pub fn confidential(
        id: ClientId,
        secret_hash: PasswordHash,
        redirect_uris: Vec<RedirectUri>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            secret_hash: Some(secret_hash),
            confidential: true,
            redirect_uris,
            created_at,
        }
    }

    /// A client that cannot keep a secret (browser or native app).
    pub fn public(id: ClientId, redirect_uris: Vec<RedirectUri>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            secret_hash: None,
            confidential: false,
            redirect_uris,
            created_at,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.confidential && self.secret_hash.is_none() {
            return Err(DomainError::validation(
                "confidential clients must have a secret",
            ));
        }
        Ok(())
    }

    pub fn is_registered_redirect(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|r| r.as_str() == uri)
    }

    /// Resolve the redirect URI for an authorization request: an explicit URI
    /// must be registered, an absent one falls back to the first registration.
    pub fn resolve_redirect(&self, requested: Option<&str>) -> Option<RedirectUri> {
        match requested {
            Some(uri) => self
                .redirect_uris
                .iter()
                .find(|r| r.as_str() == uri)
                .cloned(),
            None => self.redirect_uris.first().cloned(),
        }
    }
}
