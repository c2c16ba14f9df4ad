// src/infrastructure/storage/error.rs
use crate::application::error::ApplicationError;

const CNT_CLIENT_PKEY: &str = "oauth_clients_pkey";
const CNT_USER_PKEY: &str = "oauth_users_pkey";
const CNT_USER_USERNAME: &str = "oauth_users_username_key";
const CNT_SCOPE_PKEY: &str = "oauth_scopes_pkey";

/// Translate a driver error into the application taxonomy. Raw driver
/// errors never leave the storage adapter.
pub fn map_sqlx(err: sqlx::Error) -> ApplicationError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(constraint) = db_err.constraint() {
                match constraint {
                    CNT_CLIENT_PKEY => return ApplicationError::conflict("client already exists"),
                    CNT_USER_PKEY => return ApplicationError::conflict("user already exists"),
                    CNT_USER_USERNAME => {
                        return ApplicationError::conflict("username already exists");
                    }
                    CNT_SCOPE_PKEY => return ApplicationError::conflict("scope already exists"),
                    _ => {}
                }
            }

            if db_err.code().as_deref() == Some("23505") {
                return ApplicationError::conflict("unique constraint violated");
            }

            ApplicationError::backend_unavailable(db_err.message().to_string())
        }
        _ => ApplicationError::backend_unavailable(err.to_string()),
    }
}
