// src/application/authority/client_auth.rs
use super::TokenAuthority;
use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::{Client, ClientId};

impl TokenAuthority {
    /// Confidential clients must present a matching secret; public clients
    /// must not present one.
    pub async fn authenticate_client(
        &self,
        client_id: &str,
        secret: Option<&str>,
    ) -> ApplicationResult<Client> {
        self.within_deadline("authenticate_client", self.verify_client(client_id, secret))
            .await
    }

    pub(super) async fn verify_client(
        &self,
        client_id: &str,
        secret: Option<&str>,
    ) -> ApplicationResult<Client> {
        let id = ClientId::new(client_id)
            .map_err(|_| ApplicationError::invalid_credentials("client id is required"))?;
        let client = self.load_client(&id).await?;

        match (&client.secret_hash, secret) {
            (Some(hash), Some(secret)) => {
                self.password_hasher.verify(secret, hash.as_str()).await?;
            }
            (Some(_), None) => {
                return Err(ApplicationError::invalid_credentials(
                    "client secret is required",
                ));
            }
            (None, Some(_)) => {
                return Err(ApplicationError::invalid_credentials(
                    "client has no secret registered",
                ));
            }
            (None, None) if client.confidential => {
                return Err(ApplicationError::invalid_credentials(
                    "confidential client has no secret registered",
                ));
            }
            (None, None) => {}
        }

        Ok(client)
    }

    pub(super) async fn load_client(&self, id: &ClientId) -> ApplicationResult<Client> {
        self.storage
            .get_client(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found(format!("client {id}")))
    }
}
