// src/application/authority/config.rs
use chrono::Duration;

/// Lifetimes and policies the authority is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    pub access_token_lifetime: Duration,
    pub refresh_token_lifetime: Duration,
    pub authorization_code_lifetime: Duration,
    pub rotate_refresh_tokens: bool,
    pub client_credentials_refresh_token: bool,
    /// Upper bound for every backend round trip of a single operation.
    pub backend_timeout: std::time::Duration,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Duration::seconds(3600),
            refresh_token_lifetime: Duration::days(14),
            authorization_code_lifetime: Duration::seconds(3600),
            rotate_refresh_tokens: true,
            client_credentials_refresh_token: false,
            backend_timeout: std::time::Duration::from_secs(5),
        }
    }
}
