// src/domain/mod.rs
pub mod client;
pub mod errors;
pub mod grant;
pub mod scope;
pub mod token;
pub mod user;

pub use client::{Client, ClientId, RedirectUri};
pub use errors::{DomainError, DomainResult};
pub use grant::GrantType;
pub use scope::{Scope, ScopeSet};
pub use token::{AccessToken, AuthorizationCode, ExpiringRecord, RefreshToken};
pub use user::{PasswordHash, User, UserId, Username};
