use anyhow::Result;
use oauth_authority::application::{
    ports::{metrics::MetricsRecorder, security::PasswordHasher, storage::Storage, time::Clock},
    sweeper::ExpirationSweeper,
};
use oauth_authority::config::AppConfig;
use oauth_authority::infrastructure::{
    authority::build_authority, observability::TracingMetrics, security::Argon2PasswordHasher,
    storage::build_storage, time::SystemClock,
};
use std::{sync::Arc, time::Duration};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(err) = bootstrap().await {
        tracing::error!(error = %err, "fatal error");
        eprintln!("fatal error: {err}");
        std::process::exit(1);
    }
}

async fn bootstrap() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let password_hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2PasswordHasher);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metrics: Arc<dyn MetricsRecorder> = Arc::new(TracingMetrics);

    let storage: Arc<dyn Storage> = build_storage(
        &config,
        Arc::clone(&password_hasher),
        Arc::clone(&clock),
        Arc::clone(&metrics),
    )
    .await?;
    storage.health_check().await?;
    tracing::info!(backend = ?config.storage_backend(), cache = ?config.cache_backend(), "storage ready");

    let runtime = build_authority(
        &config,
        Arc::clone(&storage),
        password_hasher,
        Arc::clone(&clock),
        metrics,
    );
    tracing::info!(
        rotate_refresh_tokens = runtime.authority.config().rotate_refresh_tokens,
        rate_limited = runtime.rate_limiter.is_some(),
        "token authority ready"
    );

    let shutdown = CancellationToken::new();
    let limiter_maintenance = runtime
        .rate_limiter
        .clone()
        .map(|limiter| limiter.spawn_shrinker(Duration::from_secs(60), shutdown.clone()));
    let sweeper = ExpirationSweeper::new(
        Arc::clone(&storage),
        clock,
        config.sweeper_interval(),
        config.sweeper_batch_size(),
    )
    .spawn(shutdown.clone());

    shutdown_signal().await;
    shutdown.cancel();
    if let Err(err) = sweeper.await {
        tracing::warn!(error = %err, "sweeper task ended abnormally");
    }
    if let Some(handle) = limiter_maintenance {
        if let Err(err) = handle.await {
            tracing::warn!(error = %err, "rate limiter task ended abnormally");
        }
    }
    storage.close().await?;

    Ok(())
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .ok()
        .unwrap_or_else(|| "info,sqlx=warn".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer());

    if subscriber.try_init().is_err() {
        tracing::warn!("tracing subscriber already initialised");
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install CTRL+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
