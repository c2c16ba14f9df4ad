// src/domain/token/mod.rs
pub mod access_token;
pub mod authorization_code;
pub mod refresh_token;

pub use access_token::AccessToken;
pub use authorization_code::AuthorizationCode;
pub use refresh_token::RefreshToken;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Record kinds that carry an expiry and are removed by the sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiringRecord {
    AccessToken,
    RefreshToken,
    AuthorizationCode,
}

impl ExpiringRecord {
    pub const ALL: [Self; 3] = [
        Self::AccessToken,
        Self::RefreshToken,
        Self::AuthorizationCode,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "access_token",
            Self::RefreshToken => "refresh_token",
            Self::AuthorizationCode => "authorization_code",
        }
    }
}

impl fmt::Display for ExpiringRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
