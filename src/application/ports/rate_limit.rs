// src/application/ports/rate_limit.rs
use crate::domain::ClientId;

pub trait RateLimiter: Send + Sync {
    /// Returns `false` when the client has exhausted its quota.
    fn allow(&self, client_id: &ClientId) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAllRateLimiter;

impl RateLimiter for AllowAllRateLimiter {
    fn allow(&self, _: &ClientId) -> bool {
        true
    }
}
