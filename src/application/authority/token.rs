// src/application/authority/token.rs
use super::TokenAuthority;
use crate::application::{
    dto::{ClientCredentials, TokenRequest, TokenResponse},
    error::{ApplicationError, ApplicationResult},
};
use crate::domain::ClientId;
use std::time::Instant;

impl TokenAuthority {
    /// Token endpoint: authenticate the client, charge its rate limit, then run
    /// the requested grant.
    pub async fn token(
        &self,
        credentials: &ClientCredentials,
        request: TokenRequest,
    ) -> ApplicationResult<TokenResponse> {
        let client_id = ClientId::new(credentials.client_id.as_str())
            .map_err(|_| ApplicationError::invalid_credentials("client id is required"))?;

        let grant_type = request.grant_type();
        let started = Instant::now();
        let response = self
            .within_deadline(grant_type.as_str(), async {
                let client = self
                    .verify_client(
                        client_id.as_str(),
                        credentials.client_secret.as_deref(),
                    )
                    .await?;
                // Only authenticated requests draw on a client's quota.
                self.check_rate_limit(&client.id)?;
                match request {
                    TokenRequest::ClientCredentials { scope } => {
                        self.client_credentials_grant(&client, scope.as_deref())
                            .await
                    }
                    TokenRequest::Password {
                        username,
                        password,
                        scope,
                    } => {
                        self.password_grant(&client, &username, &password, scope.as_deref())
                            .await
                    }
                    TokenRequest::AuthorizationCode { code, redirect_uri } => {
                        self.authorization_code_grant(&client, &code, redirect_uri.as_deref())
                            .await
                    }
                    TokenRequest::RefreshToken {
                        refresh_token,
                        scope,
                    } => {
                        self.refresh_token_grant(&client, &refresh_token, scope.as_deref())
                            .await
                    }
                }
            })
            .await?;

        self.metrics
            .record_token_issued(&client_id, grant_type, started.elapsed());
        tracing::debug!(client_id = %client_id, grant_type = %grant_type, "token issued");
        Ok(response)
    }
}
