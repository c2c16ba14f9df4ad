// src/application/ports/cache.rs
use crate::application::{ApplicationResult, error::ApplicationError};
use crate::domain::{AccessToken, Client, ClientId, User, UserId, Username};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use std::{collections::HashMap, fmt, marker::PhantomData, sync::Arc, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub keys: u64,
    pub hit_ratio: f64,
}

impl CacheStats {
    pub fn new(hits: u64, misses: u64, keys: u64) -> Self {
        let lookups = hits + misses;
        #[allow(clippy::cast_precision_loss)]
        let hit_ratio = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64
        };
        Self {
            hits,
            misses,
            keys,
            hit_ratio,
        }
    }
}

/// Byte-level cache contract. Entries disappear once their TTL elapses.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> ApplicationResult<()>;
    async fn get(&self, key: &str) -> ApplicationResult<Option<Vec<u8>>>;
    async fn delete(&self, key: &str) -> ApplicationResult<()>;
    async fn set_multi(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> ApplicationResult<()>;
    /// Only hits are present in the returned map.
    async fn get_multi(&self, keys: &[String]) -> ApplicationResult<HashMap<String, Vec<u8>>>;
    async fn delete_multi(&self, keys: &[String]) -> ApplicationResult<()>;
    async fn flush_all(&self) -> ApplicationResult<()>;
    async fn stats(&self) -> ApplicationResult<CacheStats>;
    async fn close(&self) -> ApplicationResult<()>;
}

/// Cache key bound to the entity type stored under it.
pub struct CacheKey<T> {
    key: String,
    entity: PhantomData<fn() -> T>,
}

impl<T> CacheKey<T> {
    fn new(key: String) -> Self {
        Self {
            key,
            entity: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }
}

impl<T> Clone for CacheKey<T> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<T> fmt::Debug for CacheKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&self.key).finish()
    }
}

impl CacheKey<Client> {
    pub fn client(id: &ClientId) -> Self {
        Self::new(format!("client:{id}"))
    }
}

impl CacheKey<User> {
    pub fn user_by_name(username: &Username) -> Self {
        Self::new(format!("user:name:{username}"))
    }

    pub fn user_by_id(id: &UserId) -> Self {
        Self::new(format!("user:id:{id}"))
    }
}

impl CacheKey<AccessToken> {
    /// Bearer strings are hashed so they never appear in the cache keyspace.
    pub fn access_token(token: &str) -> Self {
        Self::new(format!("access_token:{}", blake3::hash(token.as_bytes()).to_hex()))
    }
}

/// Typed view over a [`CacheProvider`]; payloads are JSON encoded.
#[derive(Clone)]
pub struct TypedCache {
    inner: Arc<dyn CacheProvider>,
}

impl TypedCache {
    pub fn new(inner: Arc<dyn CacheProvider>) -> Self {
        Self { inner }
    }

    pub fn provider(&self) -> &Arc<dyn CacheProvider> {
        &self.inner
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey<T>) -> ApplicationResult<Option<T>> {
        match self.inner.get(key.as_str()).await? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }

    pub async fn set<T: Serialize + Sync>(
        &self,
        key: &CacheKey<T>,
        value: &T,
        ttl: Duration,
    ) -> ApplicationResult<()> {
        let bytes = encode(value)?;
        self.inner.set(key.as_str(), bytes, ttl).await
    }

    pub async fn delete<T>(&self, key: &CacheKey<T>) -> ApplicationResult<()> {
        self.inner.delete(key.as_str()).await
    }

    /// Results are aligned with `keys`.
    pub async fn get_multi<T: DeserializeOwned>(
        &self,
        keys: &[CacheKey<T>],
    ) -> ApplicationResult<Vec<Option<T>>> {
        let raw: Vec<String> = keys.iter().map(|k| k.key.clone()).collect();
        let mut hits = self.inner.get_multi(&raw).await?;
        raw.iter()
            .map(|key| hits.remove(key).map(|bytes| decode(&bytes)).transpose())
            .collect()
    }

    pub async fn set_multi<T: Serialize + Sync>(
        &self,
        entries: &[(CacheKey<T>, T)],
        ttl: Duration,
    ) -> ApplicationResult<()> {
        let encoded = entries
            .iter()
            .map(|(key, value)| Ok((key.key.clone(), encode(value)?)))
            .collect::<ApplicationResult<Vec<_>>>()?;
        self.inner.set_multi(encoded, ttl).await
    }

    pub async fn delete_multi<T>(&self, keys: &[CacheKey<T>]) -> ApplicationResult<()> {
        let raw: Vec<String> = keys.iter().map(|k| k.key.clone()).collect();
        self.inner.delete_multi(&raw).await
    }
}

fn encode<T: Serialize>(value: &T) -> ApplicationResult<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|err| ApplicationError::backend_unavailable(format!("cache encode: {err}")))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ApplicationResult<T> {
    serde_json::from_slice(bytes)
        .map_err(|err| ApplicationError::backend_unavailable(format!("cache decode: {err}")))
}
