//! API user model.

use anyhow::Result;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// A user allowed to request tokens.
#[derive(Debug, Clone)]
pub struct User {
    pub id: u64,
    pub username: String,
    password_hash: String,
}

impl User {
    /// Create a user, hashing `password`.
    pub fn new(id: u64, username: &str, password: &str) -> Result<Self> {
        Ok(Self {
            id,
            username: username.to_string(),
            password_hash: hash_password(password)?,
        })
    }

    /// Verify a password against this user's hash.
    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&self.password_hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))?;

    Ok(hash.to_string())
}
