// src/infrastructure/cache/mod.rs
pub mod memory;
pub mod redis;

pub use memory::InMemoryCache;
pub use redis::RedisCache;
