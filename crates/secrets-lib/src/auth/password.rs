// ============================
// crates/secrets-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
use crate::config::WorkFactor;
use crate::error::AppError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use zeroize::Zeroize;

fn hasher(work: &WorkFactor) -> Result<Argon2<'static>, AppError> {
    let params = Params::new(work.memory_kib, work.iterations, work.parallelism, None)
        .map_err(|e| AppError::Internal(format!("invalid work factor: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id with the configured work factor.
///
/// Output is a PHC-format string carrying the salt and cost parameters.
pub fn hash_password(plain: &str, work: &WorkFactor) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(work)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored PHC hash.
///
/// `Ok(false)` on mismatch; an error only for a malformed stored hash.
/// Verification uses the parameters embedded in the hash, so records
/// written under an older work factor keep verifying.
pub fn verify_password(hash: &str, plain: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("malformed password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password and zeroize the plaintext buffer.
pub fn hash_password_secure(plain: &mut String, work: &WorkFactor) -> Result<String, AppError> {
    let hash = hash_password(plain, work)?;
    plain.zeroize();
    Ok(hash)
}
