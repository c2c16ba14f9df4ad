// src/infrastructure/storage/mod.rs
pub mod cached;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod memory;
pub mod postgres;

pub use cached::CachedStorage;
pub use error::map_sqlx;
pub use factory::build_storage;
pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;
