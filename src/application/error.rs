// src/application/error.rs
use crate::domain::errors::DomainError;
use thiserror::Error;

pub type ApplicationResult<T> = Result<T, ApplicationError>;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("expired: {0}")]
    Expired(String),

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("invalid scope: {0}")]
    InvalidScope(String),

    #[error("redirect uri mismatch: {0}")]
    RedirectMismatch(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl ApplicationError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn expired(msg: impl Into<String>) -> Self {
        Self::Expired(msg.into())
    }

    pub fn invalid_credentials(msg: impl Into<String>) -> Self {
        Self::InvalidCredentials(msg.into())
    }

    pub fn invalid_scope(msg: impl Into<String>) -> Self {
        Self::InvalidScope(msg.into())
    }

    pub fn redirect_mismatch(msg: impl Into<String>) -> Self {
        Self::RedirectMismatch(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    pub fn backend_unavailable(msg: impl Into<String>) -> Self {
        Self::BackendUnavailable(msg.into())
    }

    /// RFC 6749 §5.2 error code for the token endpoint.
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::Domain(_) | Self::Validation(_) | Self::Conflict(_) => "invalid_request",
            Self::InvalidCredentials(_) => "invalid_client",
            Self::NotFound(_) | Self::Expired(_) | Self::RedirectMismatch(_) => "invalid_grant",
            Self::InvalidScope(_) => "invalid_scope",
            Self::RateLimited(_) => "slow_down",
            Self::BackendUnavailable(_) => "temporarily_unavailable",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
