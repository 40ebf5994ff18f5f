// ============================
// crates/secrets-lib/src/validation/mod.rs
// ============================
//! Input validation module.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
pub const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_SECRET_LENGTH: usize = 500;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid secret: {0}")]
    InvalidSecret(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email address cannot be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email address cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a password against the configured minimum length.
///
/// Length is the whole policy. No complexity classes are required.
pub fn validate_password(password: &str, min_length: usize) -> ValidationResult<&str> {
    if password.is_empty() {
        return Err(ValidationError::InvalidPassword(
            "Password cannot be empty".to_string(),
        ));
    }

    if password.len() < min_length {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {min_length} characters"
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password cannot exceed {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

/// Validate a submitted secret
pub fn validate_secret(secret: &str) -> ValidationResult<&str> {
    if secret.trim().is_empty() {
        return Err(ValidationError::InvalidSecret(
            "Secret cannot be empty".to_string(),
        ));
    }

    if secret.len() > MAX_SECRET_LENGTH {
        return Err(ValidationError::InvalidSecret(format!(
            "Secret cannot exceed {MAX_SECRET_LENGTH} characters"
        )));
    }

    Ok(secret)
}
