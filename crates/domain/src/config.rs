//! Configuration management

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DATABASE_FILE_NAME, DEFAULT_BASE_URL, DEFAULT_BUSY_TIMEOUT_MS, DEFAULT_CACHE_TTL_SECS,
    DEFAULT_DATA_DIR_NAME, DEFAULT_PAGE_SIZE, DEFAULT_POOL_SIZE, DEFAULT_REQUEST_TIMEOUT_SECS,
    LOG_DIR_NAME, SYNC_POLL_INTERVAL_MS, SYNC_POLL_MAX_ATTEMPTS, UPDATE_PROBE_INTERVAL_MS,
};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the cache database, token file and logs.
    pub data_dir: PathBuf,
    pub remote: RemoteConfig,
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Octobox connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    pub page_size: u32,
}

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Explicit database path. Falls back to `<data_dir>/cache.db`.
    pub path: Option<PathBuf>,
    pub pool_size: u32,
    pub busy_timeout_ms: u64,
}

/// Sync configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub cache_ttl_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_max_attempts: u32,
    pub probe_interval_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    /// Explicit log directory. Falls back to `<data_dir>/logs`.
    pub directory: Option<PathBuf>,
}

impl Config {
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| self.data_dir.join(DATABASE_FILE_NAME))
    }

    pub fn log_directory(&self) -> PathBuf {
        self.logging.directory.clone().unwrap_or_else(|| self.data_dir.join(LOG_DIR_NAME))
    }

    pub fn has_token(&self) -> bool {
        self.remote.api_token.as_deref().is_some_and(|token| !token.trim().is_empty())
    }
}

impl SyncConfig {
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }
}

impl RemoteConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR_NAME),
            remote: RemoteConfig::default(),
            database: DatabaseConfig::default(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: None, pool_size: DEFAULT_POOL_SIZE, busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            poll_interval_ms: SYNC_POLL_INTERVAL_MS,
            poll_max_attempts: SYNC_POLL_MAX_ATTEMPTS,
            probe_interval_ms: UPDATE_PROBE_INTERVAL_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false, directory: None }
    }
}
