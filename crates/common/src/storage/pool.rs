//! SQLite connection pool
//!
//! r2d2-based pooling for the local cache database. Every connection gets the
//! pragmas from [`apply_connection_pragmas`] when it is opened.

use std::path::{Path, PathBuf};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, instrument, warn};

use super::config::SqlitePoolConfig;
use super::error::{StorageError, StorageResult};
use super::pragmas::apply_connection_pragmas;

/// A connection checked out of the pool. Derefs to [`rusqlite::Connection`].
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Pool health snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub connections: u32,
    pub idle_connections: u32,
    pub max_connections: u32,
    pub message: Option<String>,
}

/// Pool of SQLite connections sharing one database file.
#[derive(Debug, Clone)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlitePoolConfig,
    path: PathBuf,
}

impl SqlitePool {
    /// Open (creating if needed) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created or the
    /// first connection cannot be opened.
    #[instrument(skip(config), fields(db_path = %path.display(), pool_size = config.max_size))]
    pub fn open(path: &Path, config: SqlitePoolConfig) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let pragma_config = config.clone();
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            apply_connection_pragmas(conn, &pragma_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!(error = %e, "failed to create sqlite pool");
                StorageError::Connection(format!("Failed to create pool: {e}"))
            })?;

        info!(max_connections = config.max_size, "sqlite pool created");

        Ok(Self { pool, config, path: path.to_path_buf() })
    }

    /// Check a connection out of the pool.
    pub fn get(&self) -> StorageResult<PooledConnection> {
        self.pool.get().map_err(|e| {
            if e.to_string().to_lowercase().contains("timed out") {
                warn!(timeout = ?self.config.connection_timeout, "sqlite connection timeout");
                StorageError::Timeout(self.config.connection_timeout.as_secs())
            } else {
                warn!(error = %e, "sqlite connection error");
                StorageError::Connection(format!("Failed to get connection: {e}"))
            }
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn config(&self) -> &SqlitePoolConfig {
        &self.config
    }

    /// Acquire a connection and run `SELECT 1`.
    pub fn health_check(&self) -> HealthStatus {
        let state = self.pool.state();
        let probe = self
            .get()
            .and_then(|conn| Ok(conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))?));

        match probe {
            Ok(_) => {
                debug!("sqlite pool healthy");
                HealthStatus {
                    healthy: true,
                    connections: state.connections,
                    idle_connections: state.idle_connections,
                    max_connections: self.config.max_size,
                    message: None,
                }
            }
            Err(e) => HealthStatus {
                healthy: false,
                connections: state.connections,
                idle_connections: state.idle_connections,
                max_connections: self.config.max_size,
                message: Some(format!("Pool unhealthy: {e}")),
            },
        }
    }
}
