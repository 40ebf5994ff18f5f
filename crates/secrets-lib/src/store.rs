// ============================
// crates/secrets-lib/src/store.rs
// ============================
//! User store abstraction with in-memory and flat-file implementations.
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::fs as tokio_fs;
use uuid::Uuid;

/// A stored user.
///
/// Every record carries at least one of `password_hash` / `google_id`:
/// local registrations set the former, federated first sign-ins the latter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    /// Unique when present; the lookup key for local authentication.
    /// No rename operation exists.
    pub username: Option<String>,
    /// PHC-format Argon2id hash; never read back as plaintext
    pub password_hash: Option<String>,
    /// Federated subject identifier, set at most once
    pub google_id: Option<String>,
    pub display_name: Option<String>,
    pub picture: Option<String>,
    /// Overwritten on each submission, never appended
    pub secret: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// A locally-registered user.
    pub fn new_local(username: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: Some(username.to_string()),
            password_hash: Some(password_hash),
            google_id: None,
            display_name: None,
            picture: None,
            secret: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// A user created on first federated sign-in. No password hash exists;
    /// the username is taken from the provider profile when available.
    pub fn new_federated(
        google_id: &str,
        username: Option<String>,
        display_name: Option<String>,
        picture: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            password_hash: None,
            google_id: Some(google_id.to_string()),
            display_name,
            picture,
            secret: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Trait for user store backends
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a record by its unique username
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError>;

    /// Find a record by id
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;

    /// Find a record by federated subject identifier
    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<UserRecord>, AppError>;

    /// Persist a new record
    async fn insert(&self, record: UserRecord) -> Result<UserRecord, AppError>;

    /// Persist changes to an existing record
    async fn update(&self, record: &UserRecord) -> Result<(), AppError>;

    /// All records with a non-null secret, oldest first
    async fn find_with_secrets(&self) -> Result<Vec<UserRecord>, AppError>;
}

/// In-memory implementation of the `UserStore` trait
#[derive(Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<Uuid, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.iter().find_map(|entry| {
            let record = entry.value();
            (record.username.as_deref() == Some(username)).then(|| record.clone())
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users.iter().find_map(|entry| {
            let record = entry.value();
            (record.google_id.as_deref() == Some(google_id)).then(|| record.clone())
        }))
    }

    async fn insert(&self, record: UserRecord) -> Result<UserRecord, AppError> {
        self.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: &UserRecord) -> Result<(), AppError> {
        if !self.users.contains_key(&record.id) {
            return Err(AppError::NotFound(format!("user {}", record.id)));
        }
        self.users.insert(record.id, record.clone());
        Ok(())
    }

    async fn find_with_secrets(&self) -> Result<Vec<UserRecord>, AppError> {
        let mut records: Vec<UserRecord> = self
            .users
            .iter()
            .filter(|entry| entry.value().secret.is_some())
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by_key(|r| (r.created_at, r.id));
        Ok(records)
    }
}

/// Flat-file implementation of the `UserStore` trait.
///
/// One pretty-printed JSON document per user under `<root>/users/`.
/// Lookups other than by id scan the directory; the store is meant for
/// small deployments and tests, behind the same seam a database driver
/// would sit behind.
#[derive(Clone)]
pub struct FlatFileUserStore {
    root: PathBuf,
}

impl FlatFileUserStore {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join("users"))?;
        Ok(Self { root })
    }

    fn user_path(&self, id: Uuid) -> PathBuf {
        self.root.join("users").join(format!("{id}.json"))
    }

    async fn load_all(&self) -> Result<Vec<UserRecord>, AppError> {
        let dir = self.root.join("users");
        let mut records = Vec::new();
        let mut entries = tokio_fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio_fs::read_to_string(&path).await?;
            let record: UserRecord = serde_json::from_str(&content)?;
            records.push(record);
        }
        Ok(records)
    }

    async fn write_record(&self, record: &UserRecord) -> Result<(), AppError> {
        let json = serde_json::to_string_pretty(record)?;
        tokio_fs::write(self.user_path(record.id), json).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for FlatFileUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, AppError> {
        let records = self.load_all().await?;
        Ok(records
            .into_iter()
            .find(|r| r.username.as_deref() == Some(username)))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let path = self.user_path(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio_fs::read_to_string(&path).await?;
        let record: UserRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    async fn find_by_google_id(&self, google_id: &str) -> Result<Option<UserRecord>, AppError> {
        let records = self.load_all().await?;
        Ok(records
            .into_iter()
            .find(|r| r.google_id.as_deref() == Some(google_id)))
    }

    async fn insert(&self, record: UserRecord) -> Result<UserRecord, AppError> {
        self.write_record(&record).await?;
        Ok(record)
    }

    async fn update(&self, record: &UserRecord) -> Result<(), AppError> {
        if !self.user_path(record.id).exists() {
            return Err(AppError::NotFound(format!("user {}", record.id)));
        }
        self.write_record(record).await
    }

    async fn find_with_secrets(&self) -> Result<Vec<UserRecord>, AppError> {
        let mut records = self.load_all().await?;
        records.retain(|r| r.secret.is_some());
        records.sort_by_key(|r| (r.created_at, r.id));
        Ok(records)
    }
}
