// src/application/ports/mod.rs
pub mod cache;
pub mod metrics;
pub mod rate_limit;
pub mod security;
pub mod storage;
pub mod time;
