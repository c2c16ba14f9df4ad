// src/infrastructure/observability.rs
use crate::application::ports::metrics::MetricsRecorder;
use crate::domain::{ClientId, GrantType};
use std::time::Duration;

/// Emits every measurement as a structured `tracing` event under the
/// `oauth_authority::metrics` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMetrics;

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

impl MetricsRecorder for TracingMetrics {
    fn record_token_issued(&self, client_id: &ClientId, grant_type: GrantType, elapsed: Duration) {
        tracing::info!(
            target: "oauth_authority::metrics",
            client_id = %client_id,
            grant_type = %grant_type,
            elapsed_ms = millis(elapsed),
            "token_issued"
        );
    }

    fn record_token_validation(&self, valid: bool, elapsed: Duration) {
        tracing::debug!(
            target: "oauth_authority::metrics",
            valid,
            elapsed_ms = millis(elapsed),
            "token_validation"
        );
    }

    fn record_cache_lookup(&self, entity: &'static str, hit: bool) {
        tracing::trace!(target: "oauth_authority::metrics", entity, hit, "cache_lookup");
    }

    fn record_storage_error(&self, operation: &'static str) {
        tracing::warn!(target: "oauth_authority::metrics", operation, "storage_error");
    }
}
