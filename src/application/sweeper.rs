// src/application/sweeper.rs
use crate::application::{
    ApplicationResult,
    ports::{storage::Storage, time::Clock},
};
use crate::domain::ExpiringRecord;
use std::{sync::Arc, time::Duration};
use tokio::{task::JoinHandle, time::interval};
use tokio_util::sync::CancellationToken;

/// Rows removed by one sweep, per record kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub access_tokens: u64,
    pub refresh_tokens: u64,
    pub authorization_codes: u64,
    pub cancelled: bool,
}

impl SweepReport {
    pub fn total(&self) -> u64 {
        self.access_tokens + self.refresh_tokens + self.authorization_codes
    }

    fn add(&mut self, kind: ExpiringRecord, removed: u64) {
        match kind {
            ExpiringRecord::AccessToken => self.access_tokens += removed,
            ExpiringRecord::RefreshToken => self.refresh_tokens += removed,
            ExpiringRecord::AuthorizationCode => self.authorization_codes += removed,
        }
    }
}

/// Shortest tick the sweeper accepts; `tokio::time::interval` panics on zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodically deletes expired tokens and codes in bounded batches.
#[derive(Clone)]
pub struct ExpirationSweeper {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    batch_size: u32,
}

impl ExpirationSweeper {
    pub fn new(
        storage: Arc<dyn Storage>,
        clock: Arc<dyn Clock>,
        interval: Duration,
        batch_size: u32,
    ) -> Self {
        Self {
            storage,
            clock,
            interval: interval.max(MIN_INTERVAL),
            batch_size: batch_size.max(1),
        }
    }

    /// One full pass over every record kind. Stops early, with
    /// `cancelled` set, when `shutdown` fires between batches.
    pub async fn sweep_once(&self, shutdown: &CancellationToken) -> ApplicationResult<SweepReport> {
        let cutoff = self.clock.now();
        let mut report = SweepReport::default();

        for kind in ExpiringRecord::ALL {
            loop {
                if shutdown.is_cancelled() {
                    report.cancelled = true;
                    return Ok(report);
                }
                let removed = self
                    .storage
                    .delete_expired(kind, cutoff, self.batch_size)
                    .await?;
                report.add(kind, removed);
                if removed < u64::from(self.batch_size) {
                    break;
                }
            }
        }

        Ok(report)
    }

    /// Run until `shutdown` is cancelled. Failures are logged and retried on
    /// the next tick.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.interval);
            tracing::info!(interval_secs = self.interval.as_secs(), "expiration sweeper started");

            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match self.sweep_once(&shutdown).await {
                    Ok(report) if report.total() > 0 => tracing::info!(
                        access_tokens = report.access_tokens,
                        refresh_tokens = report.refresh_tokens,
                        authorization_codes = report.authorization_codes,
                        "expired records swept"
                    ),
                    Ok(_) => tracing::debug!("nothing to sweep"),
                    Err(err) => tracing::warn!(error = %err, "expiration sweep failed"),
                }
            }

            tracing::info!("expiration sweeper stopped");
        })
    }
}
