// src/infrastructure/storage/memory.rs
use crate::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::{security::PasswordHasher, storage::Storage},
};
use super::credentials::UserCredentials;
use crate::domain::{
    AccessToken, AuthorizationCode, Client, ClientId, ExpiringRecord, RefreshToken, Scope, User,
    UserId, Username,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct State {
    closed: bool,
    clients: HashMap<ClientId, Client>,
    users: HashMap<UserId, User>,
    user_ids_by_name: HashMap<Username, UserId>,
    scopes: BTreeMap<String, Scope>,
    access_tokens: HashMap<String, AccessToken>,
    refresh_tokens: HashMap<String, RefreshToken>,
    authorization_codes: HashMap<String, AuthorizationCode>,
}

impl State {
    fn user_by_name(&self, username: &Username) -> Option<&User> {
        self.user_ids_by_name
            .get(username)
            .and_then(|id| self.users.get(id))
    }
}

/// Process-local backend. One reader/writer lock guards the whole state so
/// multi-row operations observe a consistent snapshot.
pub struct MemoryStorage {
    state: RwLock<State>,
    credentials: UserCredentials,
}

impl MemoryStorage {
    pub fn new(password_hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            state: RwLock::new(State::default()),
            credentials: UserCredentials::new(password_hasher),
        }
    }

    async fn read(&self) -> ApplicationResult<RwLockReadGuard<'_, State>> {
        let state = self.state.read().await;
        if state.closed {
            return Err(closed());
        }
        Ok(state)
    }

    async fn write(&self) -> ApplicationResult<RwLockWriteGuard<'_, State>> {
        let state = self.state.write().await;
        if state.closed {
            return Err(closed());
        }
        Ok(state)
    }
}

fn closed() -> ApplicationError {
    ApplicationError::backend_unavailable("memory storage is closed")
}

fn take_expired<T>(
    records: &mut HashMap<String, T>,
    expires_at: impl Fn(&T) -> DateTime<Utc>,
    before: DateTime<Utc>,
    limit: u32,
) -> u64 {
    let expired: Vec<String> = records
        .iter()
        .filter(|(_, record)| expires_at(record) < before)
        .map(|(key, _)| key.clone())
        .take(limit as usize)
        .collect();
    for key in &expired {
        records.remove(key);
    }
    expired.len() as u64
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get_client(&self, id: &ClientId) -> ApplicationResult<Option<Client>> {
        Ok(self.read().await?.clients.get(id).cloned())
    }

    async fn create_client(&self, client: Client) -> ApplicationResult<()> {
        client.validate()?;
        let mut state = self.write().await?;
        if state.clients.contains_key(&client.id) {
            return Err(ApplicationError::conflict(format!(
                "client {} already exists",
                client.id
            )));
        }
        state.clients.insert(client.id.clone(), client);
        Ok(())
    }

    async fn update_client(&self, client: Client) -> ApplicationResult<()> {
        client.validate()?;
        let mut state = self.write().await?;
        match state.clients.get_mut(&client.id) {
            Some(existing) => {
                *existing = client;
                Ok(())
            }
            None => Err(ApplicationError::not_found(format!("client {}", client.id))),
        }
    }

    async fn delete_client(&self, id: &ClientId) -> ApplicationResult<()> {
        self.write()
            .await?
            .clients
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ApplicationError::not_found(format!("client {id}")))
    }

    async fn get_user(&self, username: &Username) -> ApplicationResult<Option<User>> {
        Ok(self.read().await?.user_by_name(username).cloned())
    }

    async fn get_user_by_id(&self, id: &UserId) -> ApplicationResult<Option<User>> {
        Ok(self.read().await?.users.get(id).cloned())
    }

    async fn create_user(&self, user: User) -> ApplicationResult<()> {
        let mut state = self.write().await?;
        if state.users.contains_key(&user.id) {
            return Err(ApplicationError::conflict(format!(
                "user {} already exists",
                user.id
            )));
        }
        if state.user_ids_by_name.contains_key(&user.username) {
            return Err(ApplicationError::conflict("username already exists"));
        }
        state
            .user_ids_by_name
            .insert(user.username.clone(), user.id.clone());
        state.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn update_user(&self, user: User) -> ApplicationResult<()> {
        let mut state = self.write().await?;
        let previous = state
            .users
            .get(&user.id)
            .map(|existing| existing.username.clone())
            .ok_or_else(|| ApplicationError::not_found(format!("user {}", user.id)))?;

        if previous != user.username {
            if state.user_ids_by_name.contains_key(&user.username) {
                return Err(ApplicationError::conflict("username already exists"));
            }
            state.user_ids_by_name.remove(&previous);
            state
                .user_ids_by_name
                .insert(user.username.clone(), user.id.clone());
        }
        state.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> ApplicationResult<()> {
        let mut state = self.write().await?;
        let user = state
            .users
            .remove(id)
            .ok_or_else(|| ApplicationError::not_found(format!("user {id}")))?;
        state.user_ids_by_name.remove(&user.username);
        Ok(())
    }

    async fn authenticate_user(
        &self,
        username: &Username,
        password: &str,
    ) -> ApplicationResult<User> {
        // Hash verification is slow; never hold the lock across it.
        let user = self.read().await?.user_by_name(username).cloned();
        self.credentials.check(user, password).await
    }

    async fn store_access_token(&self, token: AccessToken) -> ApplicationResult<()> {
        let mut state = self.write().await?;
        if state.access_tokens.contains_key(&token.token) {
            return Err(ApplicationError::conflict("access token already exists"));
        }
        state.access_tokens.insert(token.token.clone(), token);
        Ok(())
    }

    async fn get_access_token(&self, token: &str) -> ApplicationResult<Option<AccessToken>> {
        Ok(self.read().await?.access_tokens.get(token).cloned())
    }

    async fn delete_access_token(&self, token: &str) -> ApplicationResult<bool> {
        Ok(self.write().await?.access_tokens.remove(token).is_some())
    }

    async fn batch_get_access_tokens(
        &self,
        tokens: &[String],
    ) -> ApplicationResult<Vec<AccessToken>> {
        let state = self.read().await?;
        Ok(tokens
            .iter()
            .filter_map(|token| state.access_tokens.get(token).cloned())
            .collect())
    }

    async fn batch_delete_access_tokens(&self, tokens: &[String]) -> ApplicationResult<u64> {
        let mut state = self.write().await?;
        Ok(tokens
            .iter()
            .filter(|token| state.access_tokens.remove(token.as_str()).is_some())
            .count() as u64)
    }

    async fn store_refresh_token(&self, token: RefreshToken) -> ApplicationResult<()> {
        let mut state = self.write().await?;
        if state.refresh_tokens.contains_key(&token.token) {
            return Err(ApplicationError::conflict("refresh token already exists"));
        }
        state.refresh_tokens.insert(token.token.clone(), token);
        Ok(())
    }

    async fn get_refresh_token(&self, token: &str) -> ApplicationResult<Option<RefreshToken>> {
        Ok(self.read().await?.refresh_tokens.get(token).cloned())
    }

    async fn delete_refresh_token(&self, token: &str) -> ApplicationResult<bool> {
        Ok(self.write().await?.refresh_tokens.remove(token).is_some())
    }

    async fn extend_refresh_tokens(
        &self,
        client_id: &ClientId,
        user_id: Option<&UserId>,
        expires_at: DateTime<Utc>,
    ) -> ApplicationResult<u64> {
        let mut state = self.write().await?;
        Ok(state
            .refresh_tokens
            .values_mut()
            .filter(|token| token.belongs_to(client_id, user_id))
            .map(|token| u64::from(token.extend_to(expires_at)))
            .sum())
    }

    async fn store_authorization_code(&self, code: AuthorizationCode) -> ApplicationResult<()> {
        let mut state = self.write().await?;
        if state.authorization_codes.contains_key(&code.code) {
            return Err(ApplicationError::conflict(
                "authorization code already exists",
            ));
        }
        state.authorization_codes.insert(code.code.clone(), code);
        Ok(())
    }

    async fn get_authorization_code(
        &self,
        code: &str,
    ) -> ApplicationResult<Option<AuthorizationCode>> {
        Ok(self.read().await?.authorization_codes.get(code).cloned())
    }

    async fn delete_authorization_code(&self, code: &str) -> ApplicationResult<bool> {
        Ok(self.write().await?.authorization_codes.remove(code).is_some())
    }

    async fn create_scope(&self, scope: Scope) -> ApplicationResult<()> {
        let mut state = self.write().await?;
        if state.scopes.contains_key(&scope.name) {
            return Err(ApplicationError::conflict(format!(
                "scope {} already exists",
                scope.name
            )));
        }
        state.scopes.insert(scope.name.clone(), scope);
        Ok(())
    }

    async fn get_scope(&self, name: &str) -> ApplicationResult<Option<Scope>> {
        Ok(self.read().await?.scopes.get(name).cloned())
    }

    async fn get_default_scope(&self) -> ApplicationResult<String> {
        let state = self.read().await?;
        let names: Vec<&str> = state
            .scopes
            .values()
            .filter(|scope| scope.is_default)
            .map(|scope| scope.name.as_str())
            .collect();
        Ok(names.join(" "))
    }

    async fn delete_expired(
        &self,
        kind: ExpiringRecord,
        before: DateTime<Utc>,
        limit: u32,
    ) -> ApplicationResult<u64> {
        let mut state = self.write().await?;
        Ok(match kind {
            ExpiringRecord::AccessToken => {
                take_expired(&mut state.access_tokens, |t| t.expires_at, before, limit)
            }
            ExpiringRecord::RefreshToken => {
                take_expired(&mut state.refresh_tokens, |t| t.expires_at, before, limit)
            }
            ExpiringRecord::AuthorizationCode => {
                take_expired(&mut state.authorization_codes, |c| c.expires_at, before, limit)
            }
        })
    }

    async fn health_check(&self) -> ApplicationResult<()> {
        self.read().await.map(|_| ())
    }

    async fn close(&self) -> ApplicationResult<()> {
        let mut state = self.state.write().await;
        *state = State {
            closed: true,
            ..State::default()
        };
        Ok(())
    }
}
