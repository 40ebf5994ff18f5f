// ============================
// crates/secrets-lib/src/auth/verifier.rs
// ============================
//! Local (username + password) credential verification.
use crate::auth::password::verify_password;
use crate::error::AppError;
use crate::store::UserStore;
use tracing::{debug, error, info};
use uuid::Uuid;

/// A successfully verified local identity.
#[derive(Clone, Debug)]
pub struct VerifiedIdentity {
    pub id: Uuid,
    pub username: String,
}

/// Stateless verifier over the user store.
pub struct LocalVerifier<S> {
    store: S,
}

impl<S: UserStore> LocalVerifier<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Verify a username/password pair.
    ///
    /// Unknown username, a record without local credentials, an unusable
    /// stored hash, and a wrong password all return `InvalidCredentials`;
    /// only the logs below say which. Store faults propagate as themselves.
    pub async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<VerifiedIdentity, AppError> {
        let Some(record) = self.store.find_by_username(username).await? else {
            debug!(username, "authentication failed (unknown username)");
            return Err(AppError::InvalidCredentials);
        };

        let Some(hash) = record.password_hash.as_deref() else {
            debug!(username, "authentication failed (no local credentials)");
            return Err(AppError::InvalidCredentials);
        };

        match verify_password(hash, password) {
            Ok(true) => {
                info!(username, "user authenticated successfully");
                Ok(VerifiedIdentity {
                    id: record.id,
                    username: username.to_string(),
                })
            },
            Ok(false) => {
                debug!(username, "authentication failed (wrong password)");
                Err(AppError::InvalidCredentials)
            },
            Err(err) => {
                error!(username, error = %err, "stored password hash is unusable");
                Err(AppError::InvalidCredentials)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::hash_password;
    use crate::config::WorkFactor;
    use crate::store::{MemoryUserStore, UserRecord};

    fn fast_work_factor() -> WorkFactor {
        WorkFactor {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }

    async fn store_with_user(username: &str, password: &str) -> MemoryUserStore {
        let store = MemoryUserStore::new();
        let hash = hash_password(password, &fast_work_factor()).unwrap();
        store
            .insert(UserRecord::new_local(username, hash))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_verify_accepts_correct_password() {
        let store = store_with_user("alice@example.com", "password123").await;
        let verifier = LocalVerifier::new(store);

        let identity = verifier
            .verify("alice@example.com", "password123")
            .await
            .unwrap();
        assert_eq!(identity.username, "alice@example.com");
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_identical() {
        let store = store_with_user("alice@example.com", "password123").await;
        let verifier = LocalVerifier::new(store);

        let unknown = verifier
            .verify("bob@example.com", "password123")
            .await
            .unwrap_err();
        let wrong = verifier
            .verify("alice@example.com", "wrongpass")
            .await
            .unwrap_err();

        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert_eq!(unknown.sanitized_message(), wrong.sanitized_message());
    }

    #[tokio::test]
    async fn test_federated_only_record_has_no_local_credentials() {
        let store = MemoryUserStore::new();
        store
            .insert(UserRecord::new_federated(
                "google-sub-1",
                Some("carol@example.com".to_string()),
                None,
                None,
            ))
            .await
            .unwrap();
        let verifier = LocalVerifier::new(store);

        let err = verifier
            .verify("carol@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_corrupt_hash_is_hidden_from_caller() {
        let store = MemoryUserStore::new();
        store
            .insert(UserRecord::new_local(
                "alice@example.com",
                "garbage".to_string(),
            ))
            .await
            .unwrap();
        let verifier = LocalVerifier::new(store);

        let err = verifier
            .verify("alice@example.com", "password123")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
}
