// src/infrastructure/security/password.rs
use crate::application::{
    error::{ApplicationError, ApplicationResult},
    ports::security::PasswordHasher,
};
use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use async_trait::async_trait;

/// Argon2id hashing for user passwords and client secrets. Runs on the
/// blocking pool; verification is constant time.
#[derive(Default, Clone)]
pub struct Argon2PasswordHasher;

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> ApplicationResult<String> {
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| ApplicationError::validation(err.to_string()))
        })
        .await
        .map_err(|err| ApplicationError::backend_unavailable(err.to_string()))?
    }

    async fn verify(&self, password: &str, expected_hash: &str) -> ApplicationResult<()> {
        let password = password.to_owned();
        let expected_hash = expected_hash.to_owned();
        tokio::task::spawn_blocking(move || -> Result<(), ApplicationError> {
            let parsed = PasswordHash::new(&expected_hash).map_err(|err| {
                tracing::warn!(error = %err, "stored credential is not a valid PHC string");
                ApplicationError::invalid_credentials("invalid credentials")
            })?;
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .map_err(|_| ApplicationError::invalid_credentials("invalid credentials"))
        })
        .await
        .map_err(|err| ApplicationError::backend_unavailable(err.to_string()))??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_only_the_original_password() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash("correct horse").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        hasher.verify("correct horse", &hash).await.unwrap();
        assert!(matches!(
            hasher.verify("wrong horse", &hash).await,
            Err(ApplicationError::InvalidCredentials(_))
        ));
    }

    #[tokio::test]
    async fn plaintext_stored_secret_never_verifies() {
        let hasher = Argon2PasswordHasher;
        assert!(matches!(
            hasher.verify("s1", "s1").await,
            Err(ApplicationError::InvalidCredentials(_))
        ));
    }
}
