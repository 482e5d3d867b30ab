//! The password step of the user write path.
//!
//! [`hash`] is called by [`crate::Users::create`] and, when a new password is
//! supplied, by [`crate::Users::update`]. Nothing on a read path hashes.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

use crate::error::{DbError, Result};

/// Salted Argon2id hash in PHC string form.
pub fn hash(plain: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| DbError::Hash(e.to_string()))
}

/// `Ok(false)` on mismatch; `Err` only if the stored hash is unreadable.
pub fn verify(plain: &str, stored: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| DbError::Hash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
