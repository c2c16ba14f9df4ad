// src/domain/token/refresh_token.rs
use crate::domain::{client::ClientId, user::UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    pub token: String,
    pub client_id: ClientId,
    pub user_id: Option<UserId>,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    pub fn issue(
        token: String,
        client_id: ClientId,
        user_id: Option<UserId>,
        scope: String,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Self {
        Self {
            token,
            client_id,
            user_id,
            scope,
            expires_at: issued_at + lifetime,
            created_at: issued_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Sliding-window extension. Expiry only ever moves forward.
    pub fn extend_to(&mut self, expires_at: DateTime<Utc>) -> bool {
        if expires_at > self.expires_at {
            self.expires_at = expires_at;
            true
        } else {
            false
        }
    }

    /// Whether this token belongs to the given client/user session.
    pub fn belongs_to(&self, client_id: &ClientId, user_id: Option<&UserId>) -> bool {
        &self.client_id == client_id && self.user_id.as_ref() == user_id
    }
}
