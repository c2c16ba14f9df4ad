// src/application/authority/authorization_code.rs
use super::TokenAuthority;
use crate::application::{
    dto::TokenResponse,
    error::{ApplicationError, ApplicationResult},
};
use crate::domain::{AuthorizationCode, Client, ClientId, RedirectUri, UserId};

impl TokenAuthority {
    /// Back end of the authorize endpoint: record a single-use code for an
    /// already authenticated resource owner.
    pub async fn issue_authorization_code(
        &self,
        client_id: &ClientId,
        user_id: &UserId,
        redirect_uri: Option<&str>,
        scope: Option<&str>,
    ) -> ApplicationResult<AuthorizationCode> {
        self.check_rate_limit(client_id)?;
        self.within_deadline("issue_authorization_code", async {
            let client = self.load_client(client_id).await?;
            let redirect = resolve_registered_redirect(&client, redirect_uri)?;
            self.ensure_user_exists(user_id).await?;
            let scope = self.resolve_scope(scope).await?;

            let code = AuthorizationCode::issue(
                self.token_generator.generate(),
                client.id.clone(),
                user_id.clone(),
                Some(redirect.into()),
                scope,
                self.clock.now(),
                self.config.authorization_code_lifetime,
            );
            self.storage.store_authorization_code(code.clone()).await?;
            tracing::debug!(client_id = %client.id, "authorization code issued");
            Ok(code)
        })
        .await
    }

    pub(super) async fn authorization_code_grant(
        &self,
        client: &Client,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> ApplicationResult<TokenResponse> {
        // Codes issued to another client are indistinguishable from unknown codes.
        let stored = self
            .storage
            .get_authorization_code(code)
            .await?
            .filter(|stored| stored.client_id == client.id)
            .ok_or_else(|| ApplicationError::not_found("authorization code"))?;

        let now = self.clock.now();
        if stored.is_expired(now) {
            return Err(ApplicationError::expired("authorization code"));
        }
        if !stored.redirect_matches(redirect_uri) {
            return Err(ApplicationError::redirect_mismatch(
                "redirect uri differs from the one used at authorization",
            ));
        }
        if !self.storage.delete_authorization_code(code).await? {
            return Err(ApplicationError::not_found(
                "authorization code already redeemed",
            ));
        }

        let issued = self
            .mint(&client.id, Some(&stored.user_id), stored.scope, true, now)
            .await?;
        Ok(issued.into_response(now))
    }

    pub(super) async fn ensure_user_exists(&self, user_id: &UserId) -> ApplicationResult<()> {
        match self.storage.get_user_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(ApplicationError::not_found(format!("user {user_id}"))),
        }
    }
}

pub(super) fn resolve_registered_redirect(
    client: &Client,
    requested: Option<&str>,
) -> ApplicationResult<RedirectUri> {
    client.resolve_redirect(requested).ok_or_else(|| match requested {
        Some(uri) => ApplicationError::redirect_mismatch(format!("{uri} is not registered")),
        None => ApplicationError::validation("client has no registered redirect uri"),
    })
}
