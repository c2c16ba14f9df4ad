//! OAuth2 token authority: grant-type state machines, token validation and
//! introspection over pluggable storage and cache backends.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
