// src/application/authority/implicit.rs
use super::{TokenAuthority, authorization_code::resolve_registered_redirect};
use crate::application::{
    dto::{ImplicitGrant, token::BEARER},
    error::ApplicationResult,
};
use crate::domain::{ClientId, GrantType, UserId};
use std::time::Instant;

impl TokenAuthority {
    /// Implicit grant: no client secret, no refresh token. The resource owner
    /// is already authenticated by the caller.
    pub async fn grant_implicit(
        &self,
        client_id: &ClientId,
        user_id: &UserId,
        redirect_uri: Option<&str>,
        scope: Option<&str>,
        state: Option<&str>,
    ) -> ApplicationResult<ImplicitGrant> {
        self.check_rate_limit(client_id)?;
        let started = Instant::now();
        let grant = self
            .within_deadline("implicit", async {
                let client = self.load_client(client_id).await?;
                let redirect = resolve_registered_redirect(&client, redirect_uri)?;
                self.ensure_user_exists(user_id).await?;
                let scope = self.resolve_scope(scope).await?;

                let now = self.clock.now();
                let issued = self.mint(&client.id, Some(user_id), scope, false, now).await?;
                Ok(ImplicitGrant {
                    redirect_uri: redirect.into(),
                    expires_in: issued.access.expires_in(now),
                    access_token: issued.access.token,
                    token_type: BEARER.to_owned(),
                    scope: issued.access.scope,
                    state: state.map(str::to_owned),
                })
            })
            .await?;

        self.metrics
            .record_token_issued(client_id, GrantType::Implicit, started.elapsed());
        Ok(grant)
    }
}
