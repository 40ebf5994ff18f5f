// ============================
// crates/secrets-lib/src/auth/session.rs
// ============================
//! Session token handling and management.
use crate::auth::token::generate_session_token;
use crate::store::UserRecord;
use metrics::{counter, gauge};
use secrets_common::PrincipalInfo;
use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, SystemTime},
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "secrets_session";

/// Interval between expired-session sweeps
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60); // 1 hour

/// Server-side session state.
///
/// The payload is deliberately minimal: only the user id is stored, and the
/// full record is re-fetched from the store on every request.
#[derive(Clone, Debug)]
pub struct SessionRecord {
    pub user_id: Uuid,
    pub created_at: SystemTime,
    pub expires_at: SystemTime,
}

/// The authenticated identity attached to a request once its session
/// resolves. Holds a projection of the backing record, never the record's
/// credentials.
#[derive(Clone, Debug)]
pub struct Principal {
    pub id: Uuid,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub picture: Option<String>,
}

impl Principal {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username.clone(),
            display_name: record.display_name.clone(),
            picture: record.picture.clone(),
        }
    }

    /// Client-safe projection.
    pub fn to_info(&self) -> PrincipalInfo {
        PrincipalInfo {
            id: self.id.to_string(),
            username: self.username.clone(),
            display_name: self.display_name.clone(),
            picture: self.picture.clone(),
        }
    }
}

/// Session manager for handling authentication tokens
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, SessionRecord>>>,
    ttl: Duration,
}

impl SessionManager {
    /// Create a new session manager and spawn its cleanup task.
    pub fn new(ttl: Duration) -> Self {
        let manager = SessionManager {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        };

        let manager_clone = manager.clone();
        tokio::spawn(async move {
            manager_clone.cleanup_task().await;
        });

        manager
    }

    /// Serialize an identity into a new session and return its token.
    pub async fn issue(&self, user_id: Uuid) -> String {
        let token = generate_session_token();
        let now = SystemTime::now();
        let record = SessionRecord {
            user_id,
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), record);

        counter!("session.created").increment(1);
        gauge!("session.active").set(sessions.len() as f64);

        token
    }

    /// Get a live session by token. Expired sessions are invisible here
    /// even before the sweeper removes them.
    pub async fn get(&self, token: &str) -> Option<SessionRecord> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|session| SystemTime::now() < session.expires_at)
            .cloned()
    }

    /// Invalidate a session. Returns whether a live session was removed;
    /// either way the token no longer resolves.
    pub async fn terminate(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(token).is_some();
        if removed {
            counter!("session.terminated").increment(1);
            gauge!("session.active").set(sessions.len() as f64);
        }
        removed
    }

    /// Cleanup task that runs periodically to remove expired sessions
    async fn cleanup_task(&self) {
        loop {
            tokio::time::sleep(CLEANUP_INTERVAL).await;

            let mut sessions = self.sessions.write().await;
            let now = SystemTime::now();
            let before_count = sessions.len();

            sessions.retain(|_, session| now < session.expires_at);

            let removed = before_count - sessions.len();
            if removed > 0 {
                counter!("session.expired").increment(removed as u64);
                gauge!("session.active").set(sessions.len() as f64);
            }
        }
    }
}
