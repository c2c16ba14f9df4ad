// src/domain/client/mod.rs
pub mod entity;
pub mod value_objects;

pub use entity::Client;
pub use value_objects::{ClientId, RedirectUri};
