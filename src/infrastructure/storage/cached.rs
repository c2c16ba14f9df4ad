// src/infrastructure/storage/cached.rs
use crate::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::{
        cache::{CacheKey, CacheProvider, TypedCache},
        metrics::MetricsRecorder,
        storage::Storage,
        time::Clock,
    },
};
use crate::domain::{
    AccessToken, AuthorizationCode, Client, ClientId, ExpiringRecord, RefreshToken, Scope, User,
    UserId, Username,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

/// Read-through cache in front of another [`Storage`].
///
/// The cache is an optimization only: every cache failure is logged and the
/// call is answered by the inner store. Entries for clients and users are
/// evicted after each successful write; token entries never outlive the token.
///
/// Every eviction bumps `generation`. A read-through fill records the
/// generation before reading the inner store and drops its entry again if an
/// eviction ran in between, so a slow read cannot re-cache a value that a
/// concurrent write or revocation already removed.
pub struct CachedStorage {
    inner: Arc<dyn Storage>,
    cache: TypedCache,
    generation: AtomicU64,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl CachedStorage {
    pub fn new(
        inner: Arc<dyn Storage>,
        cache: Arc<dyn CacheProvider>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            inner,
            cache: TypedCache::new(cache),
            generation: AtomicU64::new(0),
            ttl,
            clock,
            metrics,
        }
    }

    async fn cached<T: DeserializeOwned>(&self, entity: &'static str, key: &CacheKey<T>) -> Option<T> {
        match self.cache.get(key).await {
            Ok(hit) => {
                self.metrics.record_cache_lookup(entity, hit.is_some());
                if hit.is_none() {
                    tracing::debug!(entity, "cache miss");
                }
                hit
            }
            Err(err) => {
                self.cache_failed("cache_get", &err);
                None
            }
        }
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Fill `key` with a value read from the inner store while the cache was
    /// at generation `seen`.
    async fn remember<T: Serialize + Sync>(
        &self,
        key: &CacheKey<T>,
        value: &T,
        ttl: Duration,
        seen: u64,
    ) {
        if self.generation() != seen {
            return;
        }
        if let Err(err) = self.cache.set(key, value, ttl).await {
            self.cache_failed("cache_set", &err);
            return;
        }
        if self.generation() != seen {
            self.drop_keys(std::slice::from_ref(key)).await;
        }
    }

    /// Evict after a write. The inner write has already completed.
    async fn forget<T>(&self, keys: &[CacheKey<T>]) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.drop_keys(keys).await;
    }

    async fn drop_keys<T>(&self, keys: &[CacheKey<T>]) {
        let result = match keys {
            [key] => self.cache.delete(key).await,
            keys => self.cache.delete_multi(keys).await,
        };
        if let Err(err) = result {
            self.cache_failed("cache_delete", &err);
        }
    }

    fn cache_failed(&self, operation: &'static str, err: &ApplicationError) {
        tracing::warn!(operation, error = %err, "cache failure, falling back to storage");
        self.metrics.record_storage_error(operation);
    }

    /// `min(cache ttl, time until expiry)`, or `None` if the token is already due.
    fn token_ttl(&self, expires_at: DateTime<Utc>) -> Option<Duration> {
        let remaining = (expires_at - self.clock.now()).to_std().ok()?;
        let ttl = remaining.min(self.ttl);
        (!ttl.is_zero()).then_some(ttl)
    }

    fn user_keys(user: &User) -> [CacheKey<User>; 2] {
        [
            CacheKey::user_by_name(&user.username),
            CacheKey::user_by_id(&user.id),
        ]
    }
}

#[async_trait]
impl Storage for CachedStorage {
    async fn get_client(&self, id: &ClientId) -> ApplicationResult<Option<Client>> {
        let key = CacheKey::client(id);
        if let Some(client) = self.cached("client", &key).await {
            return Ok(Some(client));
        }
        let seen = self.generation();
        let client = self.inner.get_client(id).await?;
        if let Some(client) = &client {
            self.remember(&key, client, self.ttl, seen).await;
        }
        Ok(client)
    }

    async fn create_client(&self, client: Client) -> ApplicationResult<()> {
        let key = CacheKey::client(&client.id);
        self.inner.create_client(client).await?;
        self.forget(&[key]).await;
        Ok(())
    }

    async fn update_client(&self, client: Client) -> ApplicationResult<()> {
        let key = CacheKey::client(&client.id);
        self.inner.update_client(client).await?;
        self.forget(&[key]).await;
        Ok(())
    }

    async fn delete_client(&self, id: &ClientId) -> ApplicationResult<()> {
        self.inner.delete_client(id).await?;
        self.forget(&[CacheKey::client(id)]).await;
        Ok(())
    }

    async fn get_user(&self, username: &Username) -> ApplicationResult<Option<User>> {
        let key = CacheKey::user_by_name(username);
        if let Some(user) = self.cached("user", &key).await {
            return Ok(Some(user));
        }
        let seen = self.generation();
        let user = self.inner.get_user(username).await?;
        if let Some(user) = &user {
            self.remember(&key, user, self.ttl, seen).await;
        }
        Ok(user)
    }

    async fn get_user_by_id(&self, id: &UserId) -> ApplicationResult<Option<User>> {
        let key = CacheKey::user_by_id(id);
        if let Some(user) = self.cached("user", &key).await {
            return Ok(Some(user));
        }
        let seen = self.generation();
        let user = self.inner.get_user_by_id(id).await?;
        if let Some(user) = &user {
            self.remember(&key, user, self.ttl, seen).await;
        }
        Ok(user)
    }

    async fn create_user(&self, user: User) -> ApplicationResult<()> {
        let keys = Self::user_keys(&user);
        self.inner.create_user(user).await?;
        self.forget(&keys).await;
        Ok(())
    }

    async fn update_user(&self, user: User) -> ApplicationResult<()> {
        let previous = self.inner.get_user_by_id(&user.id).await?;
        let mut keys = Self::user_keys(&user).to_vec();
        if let Some(previous) = previous.filter(|p| p.username != user.username) {
            keys.push(CacheKey::user_by_name(&previous.username));
        }
        self.inner.update_user(user).await?;
        self.forget(&keys).await;
        Ok(())
    }

    async fn delete_user(&self, id: &UserId) -> ApplicationResult<()> {
        let previous = self.inner.get_user_by_id(id).await?;
        self.inner.delete_user(id).await?;
        let keys = match &previous {
            Some(user) => Self::user_keys(user).to_vec(),
            None => vec![CacheKey::user_by_id(id)],
        };
        self.forget(&keys).await;
        Ok(())
    }

    async fn authenticate_user(
        &self,
        username: &Username,
        password: &str,
    ) -> ApplicationResult<User> {
        self.inner.authenticate_user(username, password).await
    }

    async fn store_access_token(&self, token: AccessToken) -> ApplicationResult<()> {
        self.inner.store_access_token(token).await
    }

    async fn get_access_token(&self, token: &str) -> ApplicationResult<Option<AccessToken>> {
        let key = CacheKey::access_token(token);
        if let Some(hit) = self.cached("access_token", &key).await {
            return Ok(Some(hit));
        }
        let seen = self.generation();
        let found = self.inner.get_access_token(token).await?;
        if let Some(access) = &found {
            if let Some(ttl) = self.token_ttl(access.expires_at) {
                self.remember(&key, access, ttl, seen).await;
            }
        }
        Ok(found)
    }

    async fn delete_access_token(&self, token: &str) -> ApplicationResult<bool> {
        let removed = self.inner.delete_access_token(token).await?;
        self.forget(&[CacheKey::access_token(token)]).await;
        Ok(removed)
    }

    async fn batch_get_access_tokens(
        &self,
        tokens: &[String],
    ) -> ApplicationResult<Vec<AccessToken>> {
        let keys: Vec<_> = tokens.iter().map(|t| CacheKey::access_token(t)).collect();
        let seen = self.generation();
        let cached = match self.cache.get_multi(&keys).await {
            Ok(cached) => cached,
            Err(err) => {
                self.cache_failed("cache_get_multi", &err);
                vec![None; tokens.len()]
            }
        };

        let misses: Vec<String> = tokens
            .iter()
            .zip(&cached)
            .filter(|(_, hit)| hit.is_none())
            .map(|(token, _)| token.clone())
            .collect();
        let fetched = if misses.is_empty() {
            Vec::new()
        } else {
            self.inner.batch_get_access_tokens(&misses).await?
        };

        // One TTL for the whole batch; the shortest keeps every entry within its token's life.
        let entries: Vec<(CacheKey<AccessToken>, AccessToken)> = fetched
            .iter()
            .filter(|t| self.token_ttl(t.expires_at).is_some())
            .map(|t| (CacheKey::access_token(&t.token), t.clone()))
            .collect();
        let batch_ttl = entries
            .iter()
            .filter_map(|(_, t)| self.token_ttl(t.expires_at))
            .min();
        if let Some(ttl) = batch_ttl.filter(|_| self.generation() == seen) {
            if let Err(err) = self.cache.set_multi(&entries, ttl).await {
                self.cache_failed("cache_set_multi", &err);
            } else if self.generation() != seen {
                let filled: Vec<_> = entries.into_iter().map(|(key, _)| key).collect();
                self.drop_keys(&filled).await;
            }
        }

        let mut found: Vec<AccessToken> = cached.into_iter().flatten().collect();
        found.extend(fetched);
        Ok(found)
    }

    async fn batch_delete_access_tokens(&self, tokens: &[String]) -> ApplicationResult<u64> {
        let removed = self.inner.batch_delete_access_tokens(tokens).await?;
        let keys: Vec<_> = tokens.iter().map(|t| CacheKey::access_token(t)).collect();
        if !keys.is_empty() {
            self.forget(&keys).await;
        }
        Ok(removed)
    }

    async fn store_refresh_token(&self, token: RefreshToken) -> ApplicationResult<()> {
        self.inner.store_refresh_token(token).await
    }

    async fn get_refresh_token(&self, token: &str) -> ApplicationResult<Option<RefreshToken>> {
        self.inner.get_refresh_token(token).await
    }

    async fn delete_refresh_token(&self, token: &str) -> ApplicationResult<bool> {
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
        // Cached access tokens expire on their own TTL.
        self.inner.delete_expired(kind, before, limit).await
    }

    async fn health_check(&self) -> ApplicationResult<()> {
        self.inner.health_check().await
    }

    async fn close(&self) -> ApplicationResult<()> {
        if let Err(err) = self.cache.provider().close().await {
            self.cache_failed("cache_close", &err);
        }
        self.inner.close().await
    }
}
