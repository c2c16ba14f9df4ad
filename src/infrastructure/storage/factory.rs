// src/infrastructure/storage/factory.rs
use super::{CachedStorage, MemoryStorage, PostgresStorage, map_sqlx};
use crate::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::{
        cache::CacheProvider, metrics::MetricsRecorder, security::PasswordHasher,
        storage::Storage, time::Clock,
    },
};
use crate::config::{AppConfig, CacheBackend, StorageBackend};
use crate::infrastructure::{
    cache::{InMemoryCache, RedisCache},
    database,
};
use std::sync::Arc;

/// Compose the configured backend with the optional cache layer.
pub async fn build_storage(
    config: &AppConfig,
    password_hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsRecorder>,
) -> ApplicationResult<Arc<dyn Storage>> {
    let backend: Arc<dyn Storage> = match config.storage_backend() {
        StorageBackend::Memory => {
            tracing::info!("using in-memory storage");
            Arc::new(MemoryStorage::new(password_hasher))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url()
                .ok_or_else(|| ApplicationError::validation("DATABASE_URL is not set"))?;
            let pool = database::init_pool(
                url,
                config.database_max_connections(),
                config.authority().backend_timeout,
            )
            .await
            .map_err(map_sqlx)?;
            database::run_migrations(&pool)
                .await
                .map_err(|err| ApplicationError::backend_unavailable(err.to_string()))?;
            tracing::info!("using postgres storage");
            Arc::new(PostgresStorage::new(pool, password_hasher))
        }
    };

    let cache: Arc<dyn CacheProvider> = match config.cache_backend() {
        CacheBackend::None => return Ok(backend),
        CacheBackend::Memory => {
            tracing::info!(max_entries = config.cache_max_entries(), "using in-memory cache");
            Arc::new(InMemoryCache::new(config.cache_max_entries()))
        }
        CacheBackend::Redis => {
            let url = config
                .redis_url()
                .ok_or_else(|| ApplicationError::validation("REDIS_URL is not set"))?;
            tracing::info!(prefix = config.cache_key_prefix(), "using redis cache");
            Arc::new(RedisCache::from_url(url, config.cache_key_prefix())?)
        }
    };

    Ok(Arc::new(CachedStorage::new(
        backend,
        cache,
        config.cache_ttl(),
        clock,
        metrics,
    )))
}
