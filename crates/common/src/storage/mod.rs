//! Pooled SQLite storage.
//!
//! Wraps r2d2 + rusqlite with the per-connection pragmas the local cache
//! relies on: WAL journaling so readers never see a half-applied write, and a
//! busy timeout so background writers queue instead of failing.

pub mod config;
pub mod error;
pub mod pool;
pub mod pragmas;

pub use config::SqlitePoolConfig;
pub use error::{StorageError, StorageResult};
pub use pool::{HealthStatus, PooledConnection, SqlitePool};
