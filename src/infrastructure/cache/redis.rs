// src/infrastructure/cache/redis.rs
use crate::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::cache::{CacheProvider, CacheStats},
};
use async_trait::async_trait;
use deadpool_redis::{Config as DeadpoolConfig, Connection, Pool, Runtime};
use redis::AsyncCommands;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

const SCAN_BATCH: usize = 100;

/// Shared cache backed by Redis. Every key lives under `<prefix>:` so a
/// flush never touches foreign keys on a shared instance.
pub struct RedisCache {
    pool: Pool,
    prefix: String,
    hits: AtomicU64,
    misses: AtomicU64,
}

fn map_redis(err: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::backend_unavailable(format!("redis: {err}"))
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

impl RedisCache {
    /// Create a pooled cache from a redis URL (e.g. redis://:password@host:6379/0)
    pub fn from_url(url: &str, prefix: impl Into<String>) -> ApplicationResult<Self> {
        let pool = DeadpoolConfig::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .map_err(map_redis)?;

        Ok(Self {
            pool,
            prefix: prefix.into(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }

    async fn connection(&self) -> ApplicationResult<Connection> {
        self.pool.get().await.map_err(map_redis)
    }

    fn count(&self, hit: bool) {
        let counter = if hit { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Cursor-based walk over this cache's keyspace.
    async fn scan_own_keys(&self, conn: &mut Connection) -> ApplicationResult<Vec<String>> {
        let pattern = format!("{}:*", self.prefix);
        let mut keys = Vec::new();
        let mut cursor = 0u64;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(conn)
                .await
                .map_err(map_redis)?;
            keys.extend(batch);
            cursor = next;
            if cursor == 0 {
                return Ok(keys);
            }
        }
    }
}

#[async_trait]
impl CacheProvider for RedisCache {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> ApplicationResult<()> {
        let mut conn = self.connection().await?;
        conn.pset_ex::<_, _, ()>(self.key(key), value, ttl_millis(ttl))
            .await
            .map_err(map_redis)
    }

    async fn get(&self, key: &str) -> ApplicationResult<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let value: Option<Vec<u8>> = conn.get(self.key(key)).await.map_err(map_redis)?;
        self.count(value.is_some());
        Ok(value)
    }

    async fn delete(&self, key: &str) -> ApplicationResult<()> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(self.key(key)).await.map_err(map_redis)
    }

    async fn set_multi(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> ApplicationResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let millis = ttl_millis(ttl);
        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in entries {
            pipe.pset_ex(self.key(&key), value, millis).ignore();
        }
        pipe.query_async::<()>(&mut conn).await.map_err(map_redis)
    }

    async fn get_multi(&self, keys: &[String]) -> ApplicationResult<HashMap<String, Vec<u8>>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.connection().await?;
        let prefixed: Vec<String> = keys.iter().map(|key| self.key(key)).collect();
        let values: Vec<Option<Vec<u8>>> = redis::cmd("MGET")
            .arg(&prefixed)
            .query_async(&mut conn)
            .await
            .map_err(map_redis)?;

        let mut found = HashMap::with_capacity(keys.len());
        for (key, value) in keys.iter().zip(values) {
            self.count(value.is_some());
            if let Some(value) = value {
                found.insert(key.clone(), value);
            }
        }
        Ok(found)
    }

    async fn delete_multi(&self, keys: &[String]) -> ApplicationResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let prefixed: Vec<String> = keys.iter().map(|key| self.key(key)).collect();
        conn.del::<_, ()>(prefixed).await.map_err(map_redis)
    }

    async fn flush_all(&self) -> ApplicationResult<()> {
        let mut conn = self.connection().await?;
        let keys = self.scan_own_keys(&mut conn).await?;
        for chunk in keys.chunks(SCAN_BATCH) {
            conn.del::<_, ()>(chunk.to_vec()).await.map_err(map_redis)?;
        }
        Ok(())
    }

    async fn stats(&self) -> ApplicationResult<CacheStats> {
        let mut conn = self.connection().await?;
        let keys = self.scan_own_keys(&mut conn).await?.len() as u64;
        Ok(CacheStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            keys,
        ))
    }

    async fn close(&self) -> ApplicationResult<()> {
        self.pool.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_millisecond_ttls_round_up() {
        assert_eq!(ttl_millis(Duration::from_micros(10)), 1);
        assert_eq!(ttl_millis(Duration::from_secs(2)), 2000);
    }

    #[test]
    fn keys_are_namespaced() {
        let cache = RedisCache::from_url("redis://127.0.0.1:6379/0", "oauth").unwrap();
        assert_eq!(cache.key("client:web"), "oauth:client:web");
    }
}
