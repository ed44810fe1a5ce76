/// Password hashing capability (Argon2id)
use crate::error::{ApiError, ApiResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password into a self-describing digest string
pub fn hash(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|digest| digest.to_string())
        .map_err(|e| ApiError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against a stored digest
pub fn verify(password: &str, digest: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| ApiError::Internal(format!("Stored password digest is malformed: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
