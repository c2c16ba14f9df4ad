// src/application/authority/mod.rs
mod authenticate;
mod authorization_code;
mod client_auth;
mod client_credentials;
mod config;
mod implicit;
mod introspect;
mod issue;
mod password;
mod refresh;
mod revoke;
mod scope;
mod service;
mod token;

pub use config::AuthorityConfig;
pub use service::TokenAuthority;
