// =============
// crates/secrets-lib/src/auth/service.rs
// =============
//! This module defines the `AuthService` trait, the seam between the HTTP
//! front end and the credential/session core.
use crate::auth::{GoogleProfile, Principal, VerifiedIdentity};
use crate::error::AppError;
use crate::store::UserRecord;
use async_trait::async_trait;
use uuid::Uuid;

/// A successful authentication, tagged by strategy.
#[derive(Debug)]
pub enum AuthOutcome {
    Local(VerifiedIdentity),
    Federated(UserRecord),
}

impl AuthOutcome {
    /// The identity every outcome boils down to for session purposes.
    pub fn user_id(&self) -> Uuid {
        match self {
            AuthOutcome::Local(identity) => identity.id,
            AuthOutcome::Federated(record) => record.id,
        }
    }
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new local user. On success the user is already logged in;
    /// the returned token identifies the fresh session.
    async fn register(&self, username: &str, password: String) -> Result<String, AppError>;

    /// Verify a username/password pair and establish a session.
    async fn login(&self, username: &str, password: &str) -> Result<String, AppError>;

    /// Resolve a federated identity assertion and establish a session.
    async fn login_federated(&self, profile: GoogleProfile) -> Result<String, AppError>;

    /// Deserialize a session token back into a live principal.
    async fn resolve_session(&self, token: &str) -> Result<Principal, AppError>;

    /// Whether the token currently resolves to a principal.
    async fn is_authenticated(&self, token: &str) -> bool;

    /// End a session. Returns whether a live session was removed; the
    /// caller is logged out either way.
    async fn logout(&self, token: &str) -> bool;
}
