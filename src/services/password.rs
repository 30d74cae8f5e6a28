//! Argon2id password hashing, verification, and policy validation.
//!
//! Hashes carry a random per-password salt and are stored in the PHC string
//! format, so the record self-describes its algorithm and parameters and
//! verification needs no external state.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::error::{AppError, AppResult};

/// Punctuation accepted by the password policy.
const ALLOWED_SYMBOLS: &str = "@#$!%^&*";

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
///
/// Returns false on mismatch, and also on any malformed record, decoding
/// error, or algorithm mismatch. Verification never raises.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Password strength rules, enforced independently of hashing.
///
/// The minimum length comes from configuration; the remaining rules are
/// fixed. Every violated rule is reported so the API can say why a
/// password was rejected.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl PasswordPolicy {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn validate(&self, password: &str) -> Result<(), String> {
        let mut problems = Vec::new();

        if password.chars().count() < self.min_length {
            problems.push(format!("must be at least {} characters long", self.min_length));
        }
        if !password.chars().any(|c| c.is_ascii_uppercase()) {
            problems.push("must contain an uppercase letter".to_string());
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            problems.push("must contain a digit".to_string());
        }
        if !password.chars().any(|c| ALLOWED_SYMBOLS.contains(c)) {
            problems.push(format!("must contain one of {}", ALLOWED_SYMBOLS));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}
