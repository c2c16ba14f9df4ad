// src/config.rs
use crate::application::authority::AuthorityConfig;
use std::{env, num::NonZeroU32, str::FromStr, time::Duration};
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheBackend {
    None,
    Memory,
    Redis,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    storage_backend: StorageBackend,
    database_url: Option<String>,
    database_max_connections: u32,
    cache_backend: CacheBackend,
    cache_ttl: Duration,
    cache_max_entries: usize,
    redis_url: Option<String>,
    cache_key_prefix: String,
    authority: AuthorityConfig,
    sweeper_interval: Duration,
    sweeper_batch_size: u32,
    rate_limit_per_second: Option<NonZeroU32>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{key} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match lookup(key).map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) if v == "1" || v == "true" => Ok(true),
        Some(v) if v == "0" || v == "false" => Ok(false),
        Some(v) => Err(ConfigError::Invalid(format!("{key} must be a boolean, got {v}"))),
    }
}

/// Like [`parse_or`] for durations that must not be zero.
fn positive_seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    match parse_or(lookup, key, default)? {
        0 => Err(ConfigError::Invalid(format!("{key} must be greater than zero"))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn seconds(value: u64) -> chrono::Duration {
    chrono::Duration::seconds(i64::try_from(value).unwrap_or(i64::MAX))
}

impl AppConfig {
    /// Build configuration from environment variables. Uses sensible defaults
    /// for optional values and validates required keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Allow dotenv files to populate env vars when present.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let storage_backend = match lookup("STORAGE_BACKEND").as_deref().map(str::trim) {
            None | Some("memory") => StorageBackend::Memory,
            Some("postgres" | "postgresql") => StorageBackend::Postgres,
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "unknown STORAGE_BACKEND: {other}"
                )));
            }
        };
        let database_url = lookup("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let cache_backend = match lookup("CACHE_PROVIDER").as_deref().map(str::trim) {
            None | Some("none" | "") => CacheBackend::None,
            Some("memory") => CacheBackend::Memory,
            Some("redis") => CacheBackend::Redis,
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "unknown CACHE_PROVIDER: {other}"
                )));
            }
        };
        let redis_url = lookup("REDIS_URL");
        if cache_backend == CacheBackend::Redis && redis_url.is_none() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }

        let authority = AuthorityConfig {
            access_token_lifetime: seconds(parse_or(&lookup, "ACCESS_TOKEN_LIFETIME_SECONDS", 3600)?),
            refresh_token_lifetime: seconds(parse_or(
                &lookup,
                "REFRESH_TOKEN_LIFETIME_SECONDS",
                1_209_600,
            )?),
            authorization_code_lifetime: seconds(parse_or(
                &lookup,
                "AUTH_CODE_LIFETIME_SECONDS",
                3600,
            )?),
            rotate_refresh_tokens: parse_flag(&lookup, "ROTATE_REFRESH_TOKENS", true)?,
            client_credentials_refresh_token: parse_flag(
                &lookup,
                "CLIENT_CREDENTIALS_REFRESH_TOKEN",
                false,
            )?,
            backend_timeout: positive_seconds(&lookup, "BACKEND_TIMEOUT_SECONDS", 5)?,
        };

        let rate_limit_per_second = match lookup("RATE_LIMIT_PER_SECOND") {
            Some(raw) => Some(raw.trim().parse::<NonZeroU32>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "RATE_LIMIT_PER_SECOND must be a positive integer, got {raw}"
                ))
            })?),
            None => None,
        };

        Ok(Self {
            storage_backend,
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            cache_backend,
            cache_ttl: Duration::from_secs(parse_or(&lookup, "CACHE_TTL_SECONDS", 300)?),
            cache_max_entries: parse_or(&lookup, "CACHE_MAX_ENTRIES", 10_000)?,
            redis_url,
            cache_key_prefix: lookup("CACHE_KEY_PREFIX").unwrap_or_else(|| "oauth".into()),
            authority,
            sweeper_interval: positive_seconds(&lookup, "SWEEPER_INTERVAL_SECONDS", 3600)?,
            sweeper_batch_size: parse_or(&lookup, "SWEEPER_BATCH_SIZE", 1000)?,
            rate_limit_per_second,
        })
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage_backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections
    }

    pub fn cache_backend(&self) -> CacheBackend {
        self.cache_backend
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    pub fn cache_max_entries(&self) -> usize {
        self.cache_max_entries
    }

    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref()
    }

    pub fn cache_key_prefix(&self) -> &str {
        &self.cache_key_prefix
    }

    pub fn authority(&self) -> &AuthorityConfig {
        &self.authority
    }

    pub fn sweeper_interval(&self) -> Duration {
        self.sweeper_interval
    }

    pub fn sweeper_batch_size(&self) -> u32 {
        self.sweeper_batch_size
    }

    pub fn rate_limit_per_second(&self) -> Option<NonZeroU32> {
        self.rate_limit_per_second
    }
}
