// src/infrastructure/storage/credentials.rs
use crate::application::{
    ApplicationResult, error::ApplicationError, ports::security::PasswordHasher,
};
use crate::domain::User;
use std::sync::Arc;
use tokio::sync::OnceCell;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-users";

/// Password check shared by the storage backends.
///
/// An unknown username is verified against a decoy hash, so it costs the same
/// hash work as a known username with a wrong password and the response time
/// does not reveal which usernames exist.
pub struct UserCredentials {
    hasher: Arc<dyn PasswordHasher>,
    decoy: OnceCell<String>,
}

impl UserCredentials {
    pub fn new(hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            hasher,
            decoy: OnceCell::new(),
        }
    }

    pub async fn check(&self, user: Option<User>, password: &str) -> ApplicationResult<User> {
        if let Some(user) = user {
            self.hasher
                .verify(password, user.password_hash.as_str())
                .await?;
            return Ok(user);
        }

        let decoy = self
            .decoy
            .get_or_try_init(|| self.hasher.hash(DECOY_PASSWORD))
            .await?;
        // Only the work matters here, not the outcome.
        let _ = self.hasher.verify(password, decoy).await;
        Err(ApplicationError::invalid_credentials(
            "invalid username or password",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PasswordHash, UserId, Username};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingHasher {
        hashes: AtomicUsize,
        verifies: AtomicUsize,
    }

    #[async_trait]
    impl PasswordHasher for CountingHasher {
        async fn hash(&self, password: &str) -> ApplicationResult<String> {
            self.hashes.fetch_add(1, Ordering::SeqCst);
            Ok(format!("h:{password}"))
        }

        async fn verify(&self, password: &str, expected_hash: &str) -> ApplicationResult<()> {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            if expected_hash == format!("h:{password}") {
                Ok(())
            } else {
                Err(ApplicationError::invalid_credentials("mismatch"))
            }
        }
    }

    fn alice() -> User {
        User::new(
            UserId::new("u1").unwrap(),
            Username::new("alice").unwrap(),
            PasswordHash::new("h:secret").unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn unknown_users_cost_one_verification() {
        let hasher = Arc::new(CountingHasher::default());
        let credentials = UserCredentials::new(hasher.clone());

        assert!(credentials.check(Some(alice()), "secret").await.is_ok());
        let err = credentials.check(Some(alice()), "wrong").await.unwrap_err();
        assert!(matches!(err, ApplicationError::InvalidCredentials(_)));
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 2);

        for _ in 0..2 {
            let err = credentials.check(None, "secret").await.unwrap_err();
            assert!(matches!(err, ApplicationError::InvalidCredentials(_)));
        }
        assert_eq!(hasher.verifies.load(Ordering::SeqCst), 4);
        // The decoy hash is computed once.
        assert_eq!(hasher.hashes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn the_decoy_password_never_authenticates() {
        let credentials = UserCredentials::new(Arc::new(CountingHasher::default()));
        assert!(credentials.check(None, DECOY_PASSWORD).await.is_err());
    }
}
