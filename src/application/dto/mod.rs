// src/application/dto/mod.rs
pub mod introspection;
pub mod token;

pub use introspection::{IntrospectionResponse, TokenTypeHint};
pub use token::{ClientCredentials, ImplicitGrant, TokenRequest, TokenResponse};
