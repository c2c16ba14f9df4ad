// src/infrastructure/security/mod.rs
pub mod password;
pub mod token_generator;

pub use password::Argon2PasswordHasher;
pub use token_generator::RandomTokenGenerator;
