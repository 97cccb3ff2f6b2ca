//! Password Hashing
//! Mission: One-way salted hashes with a verification path that never raises

use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::error;

/// Hash a password with bcrypt. The result is self-describing
/// (`$2b$<cost>$<salt><digest>`), so the cost factor can be raised later
/// without invalidating stored hashes.
pub fn hash_password(password: &str) -> Result<String> {
    hash(password, DEFAULT_COST).context("Failed to hash password")
}

/// Verify a password against a stored hash.
///
/// Returns `false` for corrupted or legacy-format hashes instead of
/// propagating an error; the comparison itself is constant-time inside
/// the bcrypt crate.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    if !stored_hash.starts_with("$2") {
        error!("Invalid password hash format: does not start with $2");
        return false;
    }

    match verify(password, stored_hash) {
        Ok(valid) => valid,
        Err(e) => {
            error!("Password verification error: {}", e);
            false
        }
    }
}
