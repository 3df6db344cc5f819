//! # Cryptographic Utilities
//!
//! Password hashing and verification.
//!
//! ## Invariants
//! - Passwords are only ever stored as salted Argon2id hashes.
//! - Verification failure and a malformed stored hash are indistinguishable
//!   to the caller.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{ApiError, ApiResult};

/// Hash a password using Argon2id with a fresh random salt
pub fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ApiError::Internal("password hashing failed".to_string()))
}

/// Verify a password against its stored hash
///
/// Returns false for a hash that does not parse; a corrupted user record
/// reads as a failed login, not a 500.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
