// src/application/authority/introspect.rs
use super::TokenAuthority;
use crate::application::{
    dto::{IntrospectionResponse, TokenTypeHint},
    error::ApplicationResult,
};
use crate::domain::{ClientId, UserId};
use chrono::{DateTime, Utc};

impl TokenAuthority {
    /// RFC 7662 introspection. Unknown and expired tokens are reported as
    /// inactive, never as an error.
    pub async fn introspect(
        &self,
        token: &str,
        hint: Option<&str>,
    ) -> ApplicationResult<IntrospectionResponse> {
        let first = TokenTypeHint::parse_lenient(hint).unwrap_or(TokenTypeHint::AccessToken);
        self.within_deadline("introspect", async {
            for kind in [first, first.other()] {
                if let Some(response) = self.introspect_as(kind, token).await? {
                    return Ok(response);
                }
            }
            Ok(IntrospectionResponse::inactive())
        })
        .await
    }

    async fn introspect_as(
        &self,
        kind: TokenTypeHint,
        token: &str,
    ) -> ApplicationResult<Option<IntrospectionResponse>> {
        let found = match kind {
            TokenTypeHint::AccessToken => self.storage.get_access_token(token).await?.map(|t| {
                (t.client_id, t.user_id, t.scope, t.expires_at)
            }),
            TokenTypeHint::RefreshToken => self.storage.get_refresh_token(token).await?.map(|t| {
                (t.client_id, t.user_id, t.scope, t.expires_at)
            }),
        };
        let Some((client_id, user_id, scope, expires_at)) = found else {
            return Ok(None);
        };

        if self.clock.now() >= expires_at {
            return Ok(Some(IntrospectionResponse::inactive()));
        }
        self.active_response(kind, client_id, user_id.as_ref(), scope, expires_at)
            .await
            .map(Some)
    }

    async fn active_response(
        &self,
        kind: TokenTypeHint,
        client_id: ClientId,
        user_id: Option<&UserId>,
        scope: String,
        expires_at: DateTime<Utc>,
    ) -> ApplicationResult<IntrospectionResponse> {
        let username = match user_id {
            Some(id) => self
                .storage
                .get_user_by_id(id)
                .await?
                .map(|user| user.username.into()),
            None => None,
        };

        Ok(IntrospectionResponse {
            active: true,
            scope: Some(scope),
            client_id: Some(client_id.into()),
            username,
            token_type: Some(kind.as_str().to_owned()),
            exp: Some(expires_at.timestamp()),
        })
    }
}
