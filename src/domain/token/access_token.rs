// src/domain/token/access_token.rs
use crate::domain::{client::ClientId, user::UserId};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Opaque bearer credential. `user_id` is absent for client-credentials grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub client_id: ClientId,
    pub user_id: Option<UserId>,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
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

    /// Whole seconds until expiry, clamped at zero.
    pub fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}
