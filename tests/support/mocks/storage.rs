// tests/support/mocks/storage.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oauth_authority::application::{
    ApplicationResult, error::ApplicationError, ports::storage::Storage,
};
use oauth_authority::domain::{
    AccessToken, AuthorizationCode, Client, ClientId, ExpiringRecord, RefreshToken, Scope, User,
    UserId, Username,
};
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

/// Delegating storage with injectable latency and failures.
pub struct ControlledStorage {
    inner: Arc<dyn Storage>,
    client_lookup_delay: Mutex<Option<Duration>>,
    fail_access_token_writes: AtomicBool,
    fail_refresh_delete_of: Mutex<Option<String>>,
    read_stall: Mutex<Option<Duration>>,
    fail_expiry_sweeps: AtomicBool,
}

impl ControlledStorage {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self {
            inner,
            client_lookup_delay: Mutex::new(None),
            fail_access_token_writes: AtomicBool::new(false),
            fail_refresh_delete_of: Mutex::new(None),
            read_stall: Mutex::new(None),
            fail_expiry_sweeps: AtomicBool::new(false),
        }
    }

    pub fn delay_client_lookups(&self, delay: Duration) {
        *self.client_lookup_delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_access_token_writes(&self, fail: bool) {
        self.fail_access_token_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_refresh_delete_of(&self, token: &str) {
        *self.fail_refresh_delete_of.lock().unwrap() = Some(token.to_owned());
    }

    /// Client and access-token reads fetch their row, then wait before returning it.
    pub fn stall_after_reads(&self, stall: Option<Duration>) {
        *self.read_stall.lock().unwrap() = stall;
    }

    pub fn fail_expiry_sweeps(&self, fail: bool) {
        self.fail_expiry_sweeps.store(fail, Ordering::SeqCst);
    }

    async fn stall(&self) {
        let stall = *self.read_stall.lock().unwrap();
        if let Some(stall) = stall {
            tokio::time::sleep(stall).await;
        }
    }
}

fn injected() -> ApplicationError {
    ApplicationError::backend_unavailable("injected failure")
}

#[async_trait]
impl Storage for ControlledStorage {
    async fn get_client(&self, id: &ClientId) -> ApplicationResult<Option<Client>> {
        let delay = *self.client_lookup_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let client = self.inner.get_client(id).await;
        self.stall().await;
        client
    }

    async fn create_client(&self, client: Client) -> ApplicationResult<()> {
        self.inner.create_client(client).await
    }

    async fn update_client(&self, client: Client) -> ApplicationResult<()> {
        self.inner.update_client(client).await
    }

    async fn delete_client(&self, id: &ClientId) -> ApplicationResult<()> {
        self.inner.delete_client(id).await
    }

    async fn get_user(&self, username: &Username) -> ApplicationResult<Option<User>> {
        self.inner.get_user(username).await
    }

    async fn get_user_by_id(&self, id: &UserId) -> ApplicationResult<Option<User>> {
        self.inner.get_user_by_id(id).await
    }

    async fn create_user(&self, user: User) -> ApplicationResult<()> {
        self.inner.create_user(user).await
    }

    async fn update_user(&self, user: User) -> ApplicationResult<()> {
        self.inner.update_user(user).await
    }

    async fn delete_user(&self, id: &UserId) -> ApplicationResult<()> {
        self.inner.delete_user(id).await
    }

    async fn authenticate_user(
        &self,
        username: &Username,
        password: &str,
    ) -> ApplicationResult<User> {
        self.inner.authenticate_user(username, password).await
    }

    async fn store_access_token(&self, token: AccessToken) -> ApplicationResult<()> {
        if self.fail_access_token_writes.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.store_access_token(token).await
    }

    async fn get_access_token(&self, token: &str) -> ApplicationResult<Option<AccessToken>> {
        let found = self.inner.get_access_token(token).await;
        self.stall().await;
        found
    }

    async fn delete_access_token(&self, token: &str) -> ApplicationResult<bool> {
        self.inner.delete_access_token(token).await
    }

    async fn batch_get_access_tokens(
        &self,
        tokens: &[String],
    ) -> ApplicationResult<Vec<AccessToken>> {
        self.inner.batch_get_access_tokens(tokens).await
    }

    async fn batch_delete_access_tokens(&self, tokens: &[String]) -> ApplicationResult<u64> {
        self.inner.batch_delete_access_tokens(tokens).await
    }

    async fn store_refresh_token(&self, token: RefreshToken) -> ApplicationResult<()> {
        self.inner.store_refresh_token(token).await
    }

    async fn get_refresh_token(&self, token: &str) -> ApplicationResult<Option<RefreshToken>> {
        self.inner.get_refresh_token(token).await
    }

    async fn delete_refresh_token(&self, token: &str) -> ApplicationResult<bool> {
        let failing = self.fail_refresh_delete_of.lock().unwrap().clone();
        if failing.as_deref() == Some(token) {
            return Err(injected());
        }
        self.inner.delete_refresh_token(token).await
    }

    async fn extend_refresh_tokens(
        &self,
        client_id: &ClientId,
        user_id: Option<&UserId>,
        expires_at: DateTime<Utc>,
    ) -> ApplicationResult<u64> {
        self.inner
            .extend_refresh_tokens(client_id, user_id, expires_at)
            .await
    }

    async fn store_authorization_code(&self, code: AuthorizationCode) -> ApplicationResult<()> {
        self.inner.store_authorization_code(code).await
    }

    async fn get_authorization_code(
        &self,
        code: &str,
    ) -> ApplicationResult<Option<AuthorizationCode>> {
        self.inner.get_authorization_code(code).await
    }

    async fn delete_authorization_code(&self, code: &str) -> ApplicationResult<bool> {
        self.inner.delete_authorization_code(code).await
    }

    async fn create_scope(&self, scope: Scope) -> ApplicationResult<()> {
        self.inner.create_scope(scope).await
    }

    async fn get_scope(&self, name: &str) -> ApplicationResult<Option<Scope>> {
        self.inner.get_scope(name).await
    }

    async fn get_default_scope(&self) -> ApplicationResult<String> {
        self.inner.get_default_scope().await
    }

    async fn delete_expired(
        &self,
        kind: ExpiringRecord,
        before: DateTime<Utc>,
        limit: u32,
    ) -> ApplicationResult<u64> {
        if self.fail_expiry_sweeps.load(Ordering::SeqCst) {
            return Err(injected());
        }
        self.inner.delete_expired(kind, before, limit).await
    }

    async fn health_check(&self) -> ApplicationResult<()> {
        self.inner.health_check().await
    }

    async fn close(&self) -> ApplicationResult<()> {
        self.inner.close().await
    }
}
