// tests/support/mocks/mod.rs
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod cache;
pub mod metrics;
pub mod security;
pub mod storage;
pub mod time;

pub use cache::FailingCache;
pub use metrics::RecordingMetrics;
pub use security::{PlainPasswordHasher, SequentialTokenGenerator, plain_hash};
pub use storage::ControlledStorage;
pub use time::{MutableClock, fixed_now};
