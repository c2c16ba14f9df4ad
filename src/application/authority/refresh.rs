// src/application/authority/refresh.rs
use super::TokenAuthority;
use super::issue::IssuedTokens;
use crate::application::{
    dto::TokenResponse,
    error::{ApplicationError, ApplicationResult},
};
use crate::domain::{Client, RefreshToken, ScopeSet};
use chrono::{DateTime, Utc};

impl TokenAuthority {
    pub(super) async fn refresh_token_grant(
        &self,
        client: &Client,
        token: &str,
        scope: Option<&str>,
    ) -> ApplicationResult<TokenResponse> {
        let old = self
            .storage
            .get_refresh_token(token)
            .await?
            .ok_or_else(|| ApplicationError::not_found("refresh token"))?;

        let now = self.clock.now();
        if old.is_expired(now) {
            return Err(ApplicationError::expired("refresh token"));
        }
        if old.client_id != client.id {
            return Err(ApplicationError::invalid_credentials(
                "refresh token was issued to another client",
            ));
        }

        let access_scope = self.narrow_scope(&old, scope).await?;

        if self.config.rotate_refresh_tokens {
            self.rotate(client, old, access_scope, now).await
        } else {
            let access = self.new_access_token(&client.id, old.user_id.as_ref(), access_scope, now);
            self.storage.store_access_token(access.clone()).await?;
            let issued = IssuedTokens {
                access,
                refresh: Some(old),
            };
            Ok(issued.into_response(now))
        }
    }

    /// The access token may carry a subset of the refresh token's scope.
    async fn narrow_scope(
        &self,
        old: &RefreshToken,
        requested: Option<&str>,
    ) -> ApplicationResult<String> {
        let requested = requested.map(ScopeSet::parse).filter(|set| !set.is_empty());
        let Some(requested) = requested else {
            return Ok(old.scope.clone());
        };

        self.ensure_scopes_exist(&requested).await?;
        if !requested.is_subset_of(&ScopeSet::parse(&old.scope)) {
            return Err(ApplicationError::invalid_scope(
                "requested scope exceeds the scope of the refresh token",
            ));
        }
        Ok(requested.to_string())
    }

    /// Write the new pair first, then claim the old refresh token. A session is
    /// never left without a valid refresh token if a step fails.
    async fn rotate(
        &self,
        client: &Client,
        old: RefreshToken,
        access_scope: String,
        now: DateTime<Utc>,
    ) -> ApplicationResult<TokenResponse> {
        let refresh =
            self.new_refresh_token(&client.id, old.user_id.as_ref(), old.scope.clone(), now);
        self.storage.store_refresh_token(refresh.clone()).await?;

        let access = self.new_access_token(&client.id, old.user_id.as_ref(), access_scope, now);
        if let Err(err) = self.storage.store_access_token(access.clone()).await {
            self.discard_refresh_token(&refresh.token).await;
            return Err(err);
        }

        let claimed = match self.storage.delete_refresh_token(&old.token).await {
            Ok(claimed) => claimed,
            Err(err) => {
                self.discard_access_token(&access.token).await;
                self.discard_refresh_token(&refresh.token).await;
                return Err(err);
            }
        };
        if !claimed {
            self.discard_access_token(&access.token).await;
            self.discard_refresh_token(&refresh.token).await;
            return Err(ApplicationError::not_found(
                "refresh token was already rotated",
            ));
        }

        let issued = IssuedTokens {
            access,
            refresh: Some(refresh),
        };
        Ok(issued.into_response(now))
    }
}
