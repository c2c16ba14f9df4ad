// src/application/authority/service.rs
use super::AuthorityConfig;
use crate::application::{
    error::{ApplicationError, ApplicationResult},
    ports::{
        metrics::{MetricsRecorder, NoopMetrics},
        rate_limit::{AllowAllRateLimiter, RateLimiter},
        security::{PasswordHasher, TokenGenerator},
        storage::Storage,
        time::Clock,
    },
};
use crate::domain::ClientId;
use std::{future::Future, sync::Arc};

/// Grant-type state machines and token validation over the storage port.
/// Holds no request state; all state lives behind the ports.
pub struct TokenAuthority {
    pub(super) storage: Arc<dyn Storage>,
    pub(super) password_hasher: Arc<dyn PasswordHasher>,
    pub(super) token_generator: Arc<dyn TokenGenerator>,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) metrics: Arc<dyn MetricsRecorder>,
    pub(super) rate_limiter: Arc<dyn RateLimiter>,
    pub(super) config: AuthorityConfig,
}

impl TokenAuthority {
    pub fn new(
        storage: Arc<dyn Storage>,
        password_hasher: Arc<dyn PasswordHasher>,
        token_generator: Arc<dyn TokenGenerator>,
        clock: Arc<dyn Clock>,
        config: AuthorityConfig,
    ) -> Self {
        Self {
            storage,
            password_hasher,
            token_generator,
            clock,
            metrics: Arc::new(NoopMetrics),
            rate_limiter: Arc::new(AllowAllRateLimiter),
            config,
        }
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn config(&self) -> &AuthorityConfig {
        &self.config
    }

    /// Run `operation` under the configured backend deadline.
    pub(super) async fn within_deadline<T>(
        &self,
        operation: &'static str,
        future: impl Future<Output = ApplicationResult<T>>,
    ) -> ApplicationResult<T> {
        tokio::time::timeout(self.config.backend_timeout, future)
            .await
            .map_err(|_| {
                tracing::warn!(operation, "backend deadline exceeded");
                ApplicationError::backend_unavailable(format!("{operation} exceeded its deadline"))
            })?
    }

    pub(super) fn check_rate_limit(&self, client_id: &ClientId) -> ApplicationResult<()> {
        if self.rate_limiter.allow(client_id) {
            Ok(())
        } else {
            tracing::debug!(client_id = %client_id, "rate limit exceeded");
            Err(ApplicationError::rate_limited(format!(
                "too many requests for client {client_id}"
            )))
        }
    }
}
