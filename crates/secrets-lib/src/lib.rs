// ============================
// crates/secrets-lib/src/lib.rs
// ============================
//! Core functionality for the Secrets web service: credential verification,
//! session authentication, and the secret store behind them.

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod secrets;
pub mod store;
pub mod validation;

use crate::auth::{AuthService, DefaultAuth, GoogleOAuth, SessionManager};
use crate::config::Settings;
use crate::store::UserStore;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState<S> {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Settings
    pub settings: Arc<Settings>,
    /// User store backend
    pub store: S,
    /// Google OAuth client; `None` disables the federated routes
    pub google: Option<Arc<GoogleOAuth>>,
}

impl<S: UserStore + Clone + Send + Sync + 'static> AppState<S> {
    /// Create a new application state
    pub fn new(store: S, config: &Settings) -> anyhow::Result<Self> {
        let sessions = SessionManager::new(Duration::from_secs(config.session_ttl_secs));
        let auth: Arc<dyn AuthService> =
            Arc::new(DefaultAuth::new(store.clone(), sessions, config));

        let google = match &config.google {
            Some(settings) => Some(Arc::new(GoogleOAuth::from_settings(settings)?)),
            None => None,
        };

        Ok(Self {
            auth,
            settings: Arc::new(config.clone()),
            store,
            google,
        })
    }
}
