// src/infrastructure/rate_limit.rs
use crate::application::ports::rate_limit::RateLimiter;
use crate::domain::ClientId;
use governor::{DefaultKeyedRateLimiter, Quota};
use std::{num::NonZeroU32, sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::interval};
use tokio_util::sync::CancellationToken;

/// Per-client token bucket.
pub struct GovernorRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl GovernorRateLimiter {
    pub fn per_second(limit: NonZeroU32) -> Self {
        Self {
            limiter: governor::RateLimiter::keyed(Quota::per_second(limit)),
        }
    }

    /// Drop state for clients that are back at full quota.
    pub fn shrink(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Shrink the per-client state every `every` until `shutdown` fires.
    pub fn spawn_shrinker(
        self: Arc<Self>,
        every: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(every);
            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => self.shrink(),
                }
            }
            tracing::debug!("rate limiter maintenance stopped");
        })
    }
}

impl RateLimiter for GovernorRateLimiter {
    fn allow(&self, client_id: &ClientId) -> bool {
        self.limiter.check_key(&client_id.as_str().to_owned()).is_ok()
    }
}
