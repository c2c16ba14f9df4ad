// tests/support/mocks/security.rs
use async_trait::async_trait;
use oauth_authority::application::{
    ApplicationResult,
    error::ApplicationError,
    ports::security::{PasswordHasher, TokenGenerator},
};
use std::sync::Mutex;

/// Hash format understood by [`PlainPasswordHasher`].
pub fn plain_hash(password: &str) -> String {
    format!("hash::{password}")
}

/// Fast, transparent stand-in for Argon2.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, password: &str) -> ApplicationResult<String> {
        Ok(plain_hash(password))
    }

    async fn verify(&self, password: &str, expected_hash: &str) -> ApplicationResult<()> {
        if plain_hash(password) == expected_hash {
            Ok(())
        } else {
            Err(ApplicationError::invalid_credentials("password mismatch"))
        }
    }
}

/// Predictable token strings (`tok-1`, `tok-2`, ...) that tests can enumerate.
#[derive(Debug, Default)]
pub struct SequentialTokenGenerator {
    issued: Mutex<Vec<String>>,
}

impl SequentialTokenGenerator {
    pub fn issued(&self) -> Vec<String> {
        self.issued.lock().unwrap().clone()
    }
}

impl TokenGenerator for SequentialTokenGenerator {
    fn generate(&self) -> String {
        let mut issued = self.issued.lock().unwrap();
        let token = format!("tok-{}", issued.len() + 1);
        issued.push(token.clone());
        token
    }
}
