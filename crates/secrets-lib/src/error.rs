// ============================
// crates/secrets-lib/src/error.rs
// ============================
//! Central error type + Axum integration.
use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Wrong password, unknown username, or a record with no usable hash.
    /// Callers are never told which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Username already registered")]
    DuplicateUsername,

    /// Missing, expired, or unresolvable session. Requests proceed as
    /// unauthenticated, never as a crash.
    #[error("Session invalid")]
    SessionInvalid,

    #[error("Federated sign-in failed: {0}")]
    Federated(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::SessionInvalid => StatusCode::UNAUTHORIZED,
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::Federated(_) => StatusCode::BAD_GATEWAY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::DuplicateUsername => "AUTH_002",
            AppError::SessionInvalid => "SESSION_001",
            AppError::Federated(_) => "AUTH_003",
            AppError::Store(_) => "STORE_001",
            AppError::NotFound(_) => "NF_001",
            AppError::Io(_) => "IO_001",
            AppError::Json(_) => "JSON_001",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Get a sanitized message suitable for production use
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::InvalidCredentials => "Authentication failed".to_string(),
            AppError::DuplicateUsername => "Username already registered".to_string(),
            AppError::SessionInvalid => "Not logged in".to_string(),
            AppError::Federated(_) => "Federated sign-in failed".to_string(),
            AppError::Store(_) => "An internal server error occurred".to_string(),
            AppError::NotFound(_) => "Resource not found".to_string(),
            AppError::Io(_) => "Internal server error".to_string(),
            AppError::Json(_) => "Invalid request format".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Internal(msg.to_string())
    }
}
