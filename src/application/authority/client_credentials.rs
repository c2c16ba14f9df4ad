// src/application/authority/client_credentials.rs
use super::TokenAuthority;
use crate::application::{
    dto::TokenResponse,
    error::{ApplicationError, ApplicationResult},
};
use crate::domain::Client;

impl TokenAuthority {
    pub(super) async fn client_credentials_grant(
        &self,
        client: &Client,
        scope: Option<&str>,
    ) -> ApplicationResult<TokenResponse> {
        if !client.confidential {
            return Err(ApplicationError::invalid_credentials(
                "client credentials grant requires a confidential client",
            ));
        }

        let scope = self.resolve_scope(scope).await?;
        let now = self.clock.now();
        let issued = self
            .mint(
                &client.id,
                None,
                scope,
                self.config.client_credentials_refresh_token,
                now,
            )
            .await?;
        Ok(issued.into_response(now))
    }
}
