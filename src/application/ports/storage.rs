// src/application/ports/storage.rs
use crate::application::ApplicationResult;
use crate::domain::{
    AccessToken, AuthorizationCode, Client, ClientId, ExpiringRecord, RefreshToken, Scope, User,
    UserId, Username,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Persistence port every backend implements.
///
/// Lookups return `Ok(None)` for a missing record; `Err` is reserved for
/// transport or backend failures. Getters never filter by expiry.
/// Implementations must be safe for concurrent use without external locking.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_client(&self, id: &ClientId) -> ApplicationResult<Option<Client>>;
    async fn create_client(&self, client: Client) -> ApplicationResult<()>;
    async fn update_client(&self, client: Client) -> ApplicationResult<()>;
    async fn delete_client(&self, id: &ClientId) -> ApplicationResult<()>;

    async fn get_user(&self, username: &Username) -> ApplicationResult<Option<User>>;
    async fn get_user_by_id(&self, id: &UserId) -> ApplicationResult<Option<User>>;
    async fn create_user(&self, user: User) -> ApplicationResult<()>;
    async fn update_user(&self, user: User) -> ApplicationResult<()>;
    async fn delete_user(&self, id: &UserId) -> ApplicationResult<()>;
    /// Verify a username/password pair. Unknown users and wrong passwords
    /// both fail with `InvalidCredentials`.
    async fn authenticate_user(&self, username: &Username, password: &str)
    -> ApplicationResult<User>;

    async fn store_access_token(&self, token: AccessToken) -> ApplicationResult<()>;
    async fn get_access_token(&self, token: &str) -> ApplicationResult<Option<AccessToken>>;
    /// Returns `true` when this call removed the token.
    async fn delete_access_token(&self, token: &str) -> ApplicationResult<bool>;
    async fn batch_get_access_tokens(&self, tokens: &[String])
    -> ApplicationResult<Vec<AccessToken>>;
    async fn batch_delete_access_tokens(&self, tokens: &[String]) -> ApplicationResult<u64>;

    async fn store_refresh_token(&self, token: RefreshToken) -> ApplicationResult<()>;
    async fn get_refresh_token(&self, token: &str) -> ApplicationResult<Option<RefreshToken>>;
    /// Returns `true` when this call removed the token. Only one of several
    /// concurrent deletes of the same token observes `true`.
    async fn delete_refresh_token(&self, token: &str) -> ApplicationResult<bool>;
    /// Move the expiry of every refresh token of the client/user pair to
    /// `max(current, expires_at)`. A `None` user matches user-less tokens only.
    async fn extend_refresh_tokens(
        &self,
        client_id: &ClientId,
        user_id: Option<&UserId>,
        expires_at: DateTime<Utc>,
    ) -> ApplicationResult<u64>;

    async fn store_authorization_code(&self, code: AuthorizationCode) -> ApplicationResult<()>;
    async fn get_authorization_code(&self, code: &str)
    -> ApplicationResult<Option<AuthorizationCode>>;
    /// Single-use claim: `true` for exactly one caller.
    async fn delete_authorization_code(&self, code: &str) -> ApplicationResult<bool>;

    async fn create_scope(&self, scope: Scope) -> ApplicationResult<()>;
    async fn get_scope(&self, name: &str) -> ApplicationResult<Option<Scope>>;
    /// Space-joined, sorted names of all default scopes; empty when none.
    async fn get_default_scope(&self) -> ApplicationResult<String>;

    /// Delete at most `limit` records of `kind` that expired strictly before `before`.
    async fn delete_expired(
        &self,
        kind: ExpiringRecord,
        before: DateTime<Utc>,
        limit: u32,
    ) -> ApplicationResult<u64>;

    async fn health_check(&self) -> ApplicationResult<()>;
    async fn close(&self) -> ApplicationResult<()>;
}
