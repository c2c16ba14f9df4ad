// src/infrastructure/cache/memory.rs
use crate::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::cache::{CacheProvider, CacheStats},
};
use async_trait::async_trait;
use lru::LruCache;
use std::{
    collections::HashMap,
    num::NonZeroUsize,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

struct CacheEntry {
    data: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Process-local cache with LRU eviction and per-entry TTL.
pub struct InMemoryCache {
    store: RwLock<LruCache<String, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    closed: AtomicBool,
}

impl InMemoryCache {
    const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(10_000) {
        Some(n) => n,
        None => unreachable!(),
    };

    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(Self::DEFAULT_CAPACITY);
        Self {
            store: RwLock::new(LruCache::new(capacity)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    fn ensure_open(&self) -> ApplicationResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(ApplicationError::backend_unavailable("cache is closed"))
        } else {
            Ok(())
        }
    }

    fn lookup(&self, store: &mut LruCache<String, CacheEntry>, key: &str) -> Option<Vec<u8>> {
        let hit = match store.get(key) {
            Some(entry) if entry.is_expired() => {
                store.pop(key);
                None
            }
            Some(entry) => Some(entry.data.clone()),
            None => None,
        };
        let counter = if hit.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        hit
    }
}

#[async_trait]
impl CacheProvider for InMemoryCache {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> ApplicationResult<()> {
        self.ensure_open()?;
        self.store
            .write()
            .await
            .push(key.to_owned(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> ApplicationResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        // LruCache::get updates recency, so even reads need the write lock.
        let mut store = self.store.write().await;
        Ok(self.lookup(&mut store, key))
    }

    async fn delete(&self, key: &str) -> ApplicationResult<()> {
        self.ensure_open()?;
        self.store.write().await.pop(key);
        Ok(())
    }

    async fn set_multi(
        &self,
        entries: Vec<(String, Vec<u8>)>,
        ttl: Duration,
    ) -> ApplicationResult<()> {
        self.ensure_open()?;
        let mut store = self.store.write().await;
        for (key, value) in entries {
            store.push(key, CacheEntry::new(value, ttl));
        }
        Ok(())
    }

    async fn get_multi(&self, keys: &[String]) -> ApplicationResult<HashMap<String, Vec<u8>>> {
        self.ensure_open()?;
        let mut store = self.store.write().await;
        Ok(keys
            .iter()
            .filter_map(|key| self.lookup(&mut store, key).map(|data| (key.clone(), data)))
            .collect())
    }

    async fn delete_multi(&self, keys: &[String]) -> ApplicationResult<()> {
        self.ensure_open()?;
        let mut store = self.store.write().await;
        for key in keys {
            store.pop(key.as_str());
        }
        Ok(())
    }

    async fn flush_all(&self) -> ApplicationResult<()> {
        self.ensure_open()?;
        self.store.write().await.clear();
        Ok(())
    }

    async fn stats(&self) -> ApplicationResult<CacheStats> {
        self.ensure_open()?;
        let keys = self.store.read().await.len() as u64;
        Ok(CacheStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            keys,
        ))
    }

    async fn close(&self) -> ApplicationResult<()> {
        self.closed.store(true, Ordering::Release);
        self.store.write().await.clear();
        Ok(())
    }
}
