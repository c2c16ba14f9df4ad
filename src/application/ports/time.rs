// src/application/ports/time.rs
use chrono::{DateTime, Utc};

/// Source of "now" for token, code and cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
