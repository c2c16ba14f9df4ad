// tests/support/mocks/cache.rs
use async_trait::async_trait;
use oauth_authority::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::cache::{CacheProvider, CacheStats},
};
use std::{collections::HashMap, time::Duration};

/// Cache whose backend is permanently unreachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingCache;

fn down<T>() -> ApplicationResult<T> {
    Err(ApplicationError::backend_unavailable("cache is down"))
}

#[async_trait]
impl CacheProvider for FailingCache {
    async fn set(&self, _: &str, _: Vec<u8>, _: Duration) -> ApplicationResult<()> {
        down()
    }

    async fn get(&self, _: &str) -> ApplicationResult<Option<Vec<u8>>> {
        down()
    }

    async fn delete(&self, _: &str) -> ApplicationResult<()> {
        down()
    }

    async fn set_multi(&self, _: Vec<(String, Vec<u8>)>, _: Duration) -> ApplicationResult<()> {
        down()
    }

    async fn get_multi(&self, _: &[String]) -> ApplicationResult<HashMap<String, Vec<u8>>> {
        down()
    }

    async fn delete_multi(&self, _: &[String]) -> ApplicationResult<()> {
        down()
    }

    async fn flush_all(&self) -> ApplicationResult<()> {
        down()
    }

    async fn stats(&self) -> ApplicationResult<CacheStats> {
        down()
    }

    async fn close(&self) -> ApplicationResult<()> {
        down()
    }
}
