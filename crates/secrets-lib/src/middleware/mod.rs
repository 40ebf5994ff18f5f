// crates/secrets-lib/src/middleware/mod.rs

//! Middleware for the Secrets server.

pub mod auth;

pub use auth::require_auth;
