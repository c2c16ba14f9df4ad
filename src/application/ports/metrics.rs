// src/application/ports/metrics.rs
use crate::domain::{ClientId, GrantType};
use std::time::Duration;

/// Side-channel for observability. Implementations must never fail the caller.
pub trait MetricsRecorder: Send + Sync {
    fn record_token_issued(&self, client_id: &ClientId, grant_type: GrantType, elapsed: Duration);
    fn record_token_validation(&self, valid: bool, elapsed: Duration);
    fn record_cache_lookup(&self, entity: &'static str, hit: bool);
    fn record_storage_error(&self, operation: &'static str);
}

/// Discards every measurement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsRecorder for NoopMetrics {
    fn record_token_issued(&self, _: &ClientId, _: GrantType, _: Duration) {}
    fn record_token_validation(&self, _: bool, _: Duration) {}
    fn record_cache_lookup(&self, _: &'static str, _: bool) {}
    fn record_storage_error(&self, _: &'static str) {}
}
