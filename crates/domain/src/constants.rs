//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

/// Sync-status resource name for the notification feed.
pub const NOTIFICATIONS_RESOURCE: &str = "notifications";

// Cache / sync
pub const DEFAULT_CACHE_TTL_SECS: u64 = 5 * 60;
pub const SYNC_POLL_INTERVAL_MS: u64 = 1_000;
pub const SYNC_POLL_MAX_ATTEMPTS: u32 = 30;
pub const UPDATE_PROBE_INTERVAL_MS: u64 = 1_000;

// Remote service
pub const DEFAULT_BASE_URL: &str = "https://octobox.io";
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const OCTOBOX_API_HEADER: &str = "X-Octobox-API";

// Local files
pub const DEFAULT_DATA_DIR_NAME: &str = ".octotriage";
pub const DATABASE_FILE_NAME: &str = "cache.db";
pub const TOKEN_FILE_NAME: &str = "token";
pub const LOG_DIR_NAME: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "octotriage.log";

// Database
pub const DEFAULT_POOL_SIZE: u32 = 4;
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
