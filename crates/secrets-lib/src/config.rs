// ============================
// crates/secrets-lib/src/config.rs
// ============================
//! Configuration management.
use crate::validation::MIN_PASSWORD_LENGTH;
use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Session TTL in seconds
    pub session_ttl_secs: u64,
    /// Minimum password length accepted at registration
    pub min_password_length: usize,
    /// Argon2 work factor
    pub work_factor: WorkFactor,
    /// Google OAuth client; federated sign-in is disabled when absent
    pub google: Option<GoogleSettings>,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkFactor {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of iterations
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

/// Google OAuth client settings
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the callback route registered with the provider
    pub redirect_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            session_ttl_secs: 60 * 60 * 24 * 7, // 7 days
            min_password_length: MIN_PASSWORD_LENGTH,
            work_factor: WorkFactor::default(),
            google: None,
        }
    }
}

impl Default for WorkFactor {
    fn default() -> Self {
        // Argon2id defaults per the argon2 crate
        Self {
            memory_kib: 19456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl Settings {
    /// Load settings from `config/default.toml` merged with
    /// `SECRETS_`-prefixed environment variables.
    pub fn load() -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(Environment::with_prefix("SECRETS").separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from an explicit file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("SECRETS").separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject configurations the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {},
            other => anyhow::bail!("unknown log level: {other}"),
        }
        if self.session_ttl_secs == 0 {
            anyhow::bail!("session_ttl_secs must be positive");
        }
        if self.min_password_length < MIN_PASSWORD_LENGTH {
            anyhow::bail!("min_password_length must be at least {MIN_PASSWORD_LENGTH}");
        }
        if self.work_factor.memory_kib == 0
            || self.work_factor.iterations == 0
            || self.work_factor.parallelism == 0
        {
            anyhow::bail!("work_factor fields must be positive");
        }
        if let Some(google) = &self.google {
            if google.client_id.is_empty() || google.client_secret.is_empty() {
                anyhow::bail!("google client_id and client_secret must be set together");
            }
        }
        Ok(())
    }
}
