// ============================
// crates/secrets-lib/src/auth/service_impl.rs
// ============================
//! Default `AuthService` implementation over a user store.
use crate::auth::password::hash_password_secure;
use crate::auth::{
    AuthOutcome, AuthService, FederatedResolver, GoogleProfile, LocalVerifier, Principal,
    SessionManager, VerifiedIdentity,
};
use crate::config::{Settings, WorkFactor};
use crate::error::AppError;
use crate::store::{UserRecord, UserStore};
use crate::validation;
use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, error, info, warn};

pub struct DefaultAuth<S> {
    store: S,
    verifier: LocalVerifier<S>,
    resolver: FederatedResolver<S>,
    sessions: SessionManager,
    min_password_length: usize,
    work_factor: WorkFactor,
}

impl<S: UserStore + Clone + Send + Sync + 'static> DefaultAuth<S> {
    pub fn new(store: S, sessions: SessionManager, settings: &Settings) -> Self {
        Self {
            verifier: LocalVerifier::new(store.clone()),
            resolver: FederatedResolver::new(store.clone()),
            store,
            sessions,
            min_password_length: settings.min_password_length,
            work_factor: settings.work_factor.clone(),
        }
    }

    /// The one place a verified identity becomes a session.
    async fn establish(&self, outcome: AuthOutcome) -> String {
        match &outcome {
            AuthOutcome::Local(identity) => {
                debug!(username = %identity.username, "establishing session (local)");
            },
            AuthOutcome::Federated(record) => {
                debug!(user_id = %record.id, "establishing session (federated)");
            },
        }
        self.sessions.issue(outcome.user_id()).await
    }
}

#[async_trait]
impl<S: UserStore + Clone + Send + Sync + 'static> AuthService for DefaultAuth<S> {
    async fn register(&self, username: &str, mut password: String) -> Result<String, AppError> {
        validation::validate_email(username)?;
        validation::validate_password(&password, self.min_password_length)?;

        // Check-then-insert; not atomic under concurrent registration of
        // the same username.
        if self.store.find_by_username(username).await?.is_some() {
            warn!(username, "registration rejected (username exists)");
            return Err(AppError::DuplicateUsername);
        }

        let hash = hash_password_secure(&mut password, &self.work_factor)?;
        let record = self
            .store
            .insert(UserRecord::new_local(username, hash))
            .await?;

        counter!("user.registered").increment(1);
        info!(username, "user registered successfully");

        let identity = VerifiedIdentity {
            id: record.id,
            username: username.to_string(),
        };
        Ok(self.establish(AuthOutcome::Local(identity)).await)
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let identity = match self.verifier.verify(username, password).await {
            Ok(identity) => identity,
            Err(err) => {
                if matches!(err, AppError::InvalidCredentials) {
                    counter!("login.rejected").increment(1);
                }
                return Err(err);
            },
        };

        counter!("login.accepted").increment(1);
        Ok(self.establish(AuthOutcome::Local(identity)).await)
    }

    async fn login_federated(&self, profile: GoogleProfile) -> Result<String, AppError> {
        let record = self.resolver.resolve_or_create(&profile).await?;
        counter!("login.federated").increment(1);
        Ok(self.establish(AuthOutcome::Federated(record)).await)
    }

    async fn resolve_session(&self, token: &str) -> Result<Principal, AppError> {
        let Some(session) = self.sessions.get(token).await else {
            return Err(AppError::SessionInvalid);
        };

        match self.store.find_by_id(session.user_id).await {
            Ok(Some(record)) => Ok(Principal::from_record(&record)),
            Ok(None) => {
                debug!(user_id = %session.user_id, "session references a missing record");
                Err(AppError::SessionInvalid)
            },
            Err(err) => {
                // A store fault downgrades the request to unauthenticated
                error!(error = %err, "store lookup failed during session resolution");
                Err(AppError::SessionInvalid)
            },
        }
    }

    async fn is_authenticated(&self, token: &str) -> bool {
        self.resolve_session(token).await.is_ok()
    }

    async fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.terminate(token).await;
        if removed {
            info!("logout successful");
        } else {
            warn!("logout requested for an unknown or expired session");
        }
        removed
    }
}
