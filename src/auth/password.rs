use crate::error::AppError;
use bcrypt::{hash, verify};

/// bcrypt work factor; a verification takes on the order of 100ms.
pub const BCRYPT_COST: u32 = 10;

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, BCRYPT_COST)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Checks a password against a stored hash.
///
/// A mismatch is `Ok(false)`. Only an unreadable stored hash is an error.
pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::Internal(format!("Failed to verify password: {}", e)))
}
