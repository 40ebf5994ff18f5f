// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! shared between the Secrets server and its clients.
//! This module defines the HTTP request and response payloads.

use serde::{Deserialize, Serialize};

/// Registration form payload
/// # Fields
/// * `username` - Email address used as the account identifier
/// * `password` - Plaintext password (min 8 chars by default)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// Login form payload
/// # Fields
/// * `username` - Email address used as the account identifier
/// * `password` - Plaintext password
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Secret submission payload
/// # Fields
/// * `secret` - Free text; replaces any previously stored secret
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SubmitSecretRequest {
    pub secret: String,
}

/// A single entry in the public secrets listing.
///
/// Secrets are anonymous: the listing never carries the author.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    pub secret: String,
}

/// Response body for the public secrets listing
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SecretsResponse {
    pub secrets: Vec<SecretEntry>,
}

/// Client-safe view of the authenticated principal.
///
/// Never carries the password hash or any store internals.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PrincipalInfo {
    /// Record identifier, stringified for clients
    pub id: String,
    /// Email address, absent for purely federated accounts
    pub username: Option<String>,
    /// Display name learned from a federated profile
    pub display_name: Option<String>,
    /// Avatar URL learned from a federated profile
    pub picture: Option<String>,
}

impl PrincipalInfo {
    /// Display name, falling back to the username when not set.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("anonymous")
    }
}
