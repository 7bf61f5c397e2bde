//! Service configuration.

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

/// Administrator login used when nothing else is configured.
pub const DEFAULT_ADMIN_EMAIL: &str = "admin@learnershub.com";

/// Administrator password used when nothing else is configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Longest accepted session lifetime (ten years).
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

/// Which record store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; lost on exit.
    Memory,
    /// One JSON file per record under `data_dir`.
    File,
    /// `RocksDB` under `data_dir` (needs the `rocksdb-backend` feature).
    Rocksdb,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "rocksdb" | "rocks" => Ok(Self::Rocksdb),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Data directory for persistent backends (default: "./data/learnershub").
    pub data_dir: String,

    /// Record store backend (default: file).
    pub storage_backend: StorageBackend,

    /// Administrator email.
    pub admin_email: String,

    /// Administrator password.
    pub admin_password: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// How often the activity monitor re-reads the login history.
    pub activity_poll_seconds: u64,

    /// Sessions older than this are rejected.
    pub session_ttl_hours: i64,
}

/// Admin secrets file structure.
#[derive(Debug, Deserialize)]
struct AdminSecrets {
    email: String,
    password: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let (admin_email, admin_password) = load_admin_secrets();
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            storage_backend: std::env::var("STORAGE_BACKEND")
                .ok()
                .and_then(|s| match s.parse() {
                    Ok(backend) => Some(backend),
                    Err(e) => {
                        tracing::warn!(error = %e, "Ignoring STORAGE_BACKEND");
                        None
                    }
                })
                .unwrap_or(defaults.storage_backend),
            admin_email,
            admin_password,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
            activity_poll_seconds: env_parse::<u64>("ACTIVITY_POLL_SECONDS")
                .filter(|&s| s > 0)
                .unwrap_or(defaults.activity_poll_seconds),
            session_ttl_hours: env_parse::<i64>("SESSION_TTL_HOURS")
                .filter(|&h| h > 0)
                .map(|h| h.min(MAX_SESSION_TTL_HOURS))
                .unwrap_or(defaults.session_ttl_hours),
        }
    }

    /// Session lifetime, clamped to `1..=MAX_SESSION_TTL_HOURS` hours.
    #[must_use]
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Load the admin credential pair from file, environment, or the built-in default.
fn load_admin_secrets() -> (String, String) {
    let secret_paths = [
        ".secrets/admin.json",
        "learnershub/.secrets/admin.json",
        "../.secrets/admin.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<AdminSecrets>(path) {
            tracing::info!(path = %path, "Loaded admin credentials from file");
            return (secrets.email, secrets.password);
        }
    }

    tracing::debug!("Admin secrets file not found, using environment variables");
    (
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.into()),
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.into()),
    )
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "./data/learnershub".into(),
            storage_backend: StorageBackend::File,
            admin_email: DEFAULT_ADMIN_EMAIL.into(),
            admin_password: DEFAULT_ADMIN_PASSWORD.into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            activity_poll_seconds: 5,
            session_ttl_hours: 24,
        }
    }
}
