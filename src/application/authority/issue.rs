// src/application/authority/issue.rs
use super::TokenAuthority;
use crate::application::{
    dto::{TokenResponse, token::BEARER},
    error::ApplicationResult,
};
use crate::domain::{AccessToken, ClientId, RefreshToken, UserId};
use chrono::{DateTime, Utc};

pub(super) struct IssuedTokens {
    pub access: AccessToken,
    pub refresh: Option<RefreshToken>,
}

impl IssuedTokens {
    pub fn into_response(self, now: DateTime<Utc>) -> TokenResponse {
        TokenResponse {
            expires_in: self.access.expires_in(now),
            token_type: BEARER.to_owned(),
            refresh_token: self.refresh.map(|r| r.token),
            scope: self.access.scope,
            user_id: self.access.user_id.map(String::from),
            access_token: self.access.token,
        }
    }
}

impl TokenAuthority {
    pub(super) fn new_access_token(
        &self,
        client_id: &ClientId,
        user_id: Option<&UserId>,
        scope: String,
        now: DateTime<Utc>,
    ) -> AccessToken {
        AccessToken::issue(
            self.token_generator.generate(),
            client_id.clone(),
            user_id.cloned(),
            scope,
            now,
            self.config.access_token_lifetime,
        )
    }

    pub(super) fn new_refresh_token(
        &self,
        client_id: &ClientId,
        user_id: Option<&UserId>,
        scope: String,
        now: DateTime<Utc>,
    ) -> RefreshToken {
        RefreshToken::issue(
            self.token_generator.generate(),
            client_id.clone(),
            user_id.cloned(),
            scope,
            now,
            self.config.refresh_token_lifetime,
        )
    }

    /// Mint and persist an access token and, optionally, a refresh token with
    /// the same scope.
    pub(super) async fn mint(
        &self,
        client_id: &ClientId,
        user_id: Option<&UserId>,
        scope: String,
        with_refresh: bool,
        now: DateTime<Utc>,
    ) -> ApplicationResult<IssuedTokens> {
        let access = self.new_access_token(client_id, user_id, scope.clone(), now);
        self.storage.store_access_token(access.clone()).await?;

        let refresh = if with_refresh {
            let refresh = self.new_refresh_token(client_id, user_id, scope, now);
            if let Err(err) = self.storage.store_refresh_token(refresh.clone()).await {
                self.discard_access_token(&access.token).await;
                return Err(err);
            }
            Some(refresh)
        } else {
            None
        };

        Ok(IssuedTokens { access, refresh })
    }

    /// Best-effort cleanup after a partially failed issuance.
    pub(super) async fn discard_access_token(&self, token: &str) {
        if let Err(err) = self.storage.delete_access_token(token).await {
            tracing::warn!(error = %err, "failed to discard access token");
        }
    }

    pub(super) async fn discard_refresh_token(&self, token: &str) {
        if let Err(err) = self.storage.delete_refresh_token(token).await {
            tracing::warn!(error = %err, "failed to discard refresh token");
        }
    }
}
