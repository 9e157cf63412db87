//! Password hashing

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::common::ApiError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::InternalServer(format!("password hashing failed: {}", e)))
}

/// False for a wrong password and for accounts without a password (OAuth only).
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, ApiError> {
    if stored_hash.is_empty() {
        return Ok(false);
    }

    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::InternalServer(format!("stored password hash is invalid: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ApiError::InternalServer(format!(
            "password verification failed: {}",
            e
        ))),
    }
}

/// Hashing is CPU bound, so it runs off the async executor.
pub async fn hash_password_blocking(password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::InternalServer(format!("hashing task failed: {}", e)))?
}

pub async fn verify_password_blocking(password: String, stored_hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| ApiError::InternalServer(format!("verification task failed: {}", e)))?
}
