// src/infrastructure/authority.rs
use super::{rate_limit::GovernorRateLimiter, security::RandomTokenGenerator};
use crate::application::{
    authority::TokenAuthority,
    ports::{
        metrics::MetricsRecorder, security::PasswordHasher, storage::Storage, time::Clock,
    },
};
use crate::config::AppConfig;
use std::sync::Arc;

/// A fully wired authority plus the limiter it uses, if any, so the host can
/// run limiter maintenance.
pub struct AuthorityRuntime {
    pub authority: TokenAuthority,
    pub rate_limiter: Option<Arc<GovernorRateLimiter>>,
}

pub fn build_authority(
    config: &AppConfig,
    storage: Arc<dyn Storage>,
    password_hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    metrics: Arc<dyn MetricsRecorder>,
) -> AuthorityRuntime {
    let authority = TokenAuthority::new(
        storage,
        password_hasher,
        Arc::new(RandomTokenGenerator),
        clock,
        config.authority().clone(),
    )
    .with_metrics(metrics);

    match config.rate_limit_per_second() {
        Some(limit) => {
            let limiter = Arc::new(GovernorRateLimiter::per_second(limit));
            AuthorityRuntime {
                authority: authority.with_rate_limiter(limiter.clone()),
                rate_limiter: Some(limiter),
            }
        }
        None => AuthorityRuntime {
            authority,
            rate_limiter: None,
        },
    }
}
