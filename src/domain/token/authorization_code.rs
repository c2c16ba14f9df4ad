// src/domain/token/authorization_code.rs
use crate::domain::{client::ClientId, user::UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Single-use code handed out by the authorize endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationCode {
    pub code: String,
    pub client_id: ClientId,
    pub user_id: UserId,
    pub redirect_uri: Option<String>,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AuthorizationCode {
    pub fn issue(
        code: String,
        client_id: ClientId,
        user_id: UserId,
        redirect_uri: Option<String>,
        scope: String,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            code,
            client_id,
            user_id,
            redirect_uri,
            scope,
            expires_at: issued_at + lifetime,
            created_at: issued_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Byte-for-byte comparison; an absent URI only matches an absent URI.
    pub fn redirect_matches(&self, presented: Option<&str>) -> bool {
        self.redirect_uri.as_deref() == presented
    }
}
