// src/infrastructure/mod.rs
pub mod authority;
pub mod cache;
pub mod database;
pub mod observability;
pub mod rate_limit;
pub mod security;
pub mod storage;
pub mod time;
