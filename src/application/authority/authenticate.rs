// src/application/authority/authenticate.rs
use super::TokenAuthority;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::AccessToken;
use std::time::Instant;

impl TokenAuthority {
    /// Validate a bearer token.
    ///
    /// On success every refresh token of the same client/user session is
    /// pushed forward to `now + refresh_token_lifetime` (sliding expiry).
    /// The extension is session wide, not limited to the refresh token issued
    /// alongside this access token.
    pub async fn authenticate(&self, token: &str) -> ApplicationResult<AccessToken> {
        let started = Instant::now();
        let result = self.within_deadline("authenticate", self.validate(token)).await;
        self.metrics
            .record_token_validation(result.is_ok(), started.elapsed());
        result
    }

    async fn validate(&self, token: &str) -> ApplicationResult<AccessToken> {
        let access = self
            .storage
            .get_access_token(token)
            .await?
            .ok_or_else(|| ApplicationError::not_found("access token"))?;

        let now = self.clock.now();
        if access.is_expired(now) {
            return Err(ApplicationError::expired("access token"));
        }

        let extended = self
            .storage
            .extend_refresh_tokens(
                &access.client_id,
                access.user_id.as_ref(),
                now + self.config.refresh_token_lifetime,
            )
            .await?;
        tracing::trace!(client_id = %access.client_id, extended, "refresh tokens extended");

        Ok(access)
    }
}
