// src/application/authority/password.rs
use super::TokenAuthority;
use crate::application::{dto::TokenResponse, error::ApplicationResult};
use crate::domain::{Client, Username};

impl TokenAuthority {
    pub(super) async fn password_grant(
        &self,
        client: &Client,
        username: &str,
        password: &str,
        scope: Option<&str>,
    ) -> ApplicationResult<TokenResponse> {
        let username = Username::new(username)?;
        let user = self.storage.authenticate_user(&username, password).await?;

        let scope = self.resolve_scope(scope).await?;
        let now = self.clock.now();
        let issued = self
            .mint(&client.id, Some(&user.id), scope, true, now)
            .await?;
        Ok(issued.into_response(now))
    }
}
