//! Database connection manager backed by the shared SQLite pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use octotriage_common::storage::{PooledConnection, SqlitePool, SqlitePoolConfig};
use octotriage_domain::{Result, TriageError};
use rusqlite::params;
use tracing::info;

use crate::errors::conversions::to_domain;

const SCHEMA_VERSION: i32 = 1;
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Database manager that wraps a [`SqlitePool`].
#[derive(Debug, Clone)]
pub struct DbManager {
    pool: Arc<SqlitePool>,
    path: PathBuf,
}

impl DbManager {
    /// Open the cache database with the given pool size and busy timeout.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32, busy_timeout: Duration) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();

        let config = SqlitePoolConfig::default()
            .with_max_size(pool_size)
            .with_busy_timeout(busy_timeout);

        let pool = SqlitePool::open(&path, config).map_err(to_domain)?;

        info!(
            db_path = %path.display(),
            max_connections = pool.config().max_size,
            "cache database opened"
        );

        Ok(Self { pool: Arc::new(pool), path })
    }

    /// Open the database and make sure the schema exists.
    pub fn open_migrated<P: AsRef<Path>>(
        db_path: P,
        pool_size: u32,
        busy_timeout: Duration,
    ) -> Result<Self> {
        let manager = Self::new(db_path, pool_size, busy_timeout)?;
        manager.run_migrations()?;
        Ok(manager)
    }

    pub fn pool(&self) -> &Arc<SqlitePool> {
        &self.pool
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<PooledConnection> {
        self.pool.get().map_err(to_domain)
    }

    /// Ensure the full schema exists on the current database.
    pub fn run_migrations(&self) -> Result<()> {
        let conn = self.get_connection()?;
        create_schema(&conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire a connection and run a trivial query.
    pub fn health_check(&self) -> Result<()> {
        let status = self.pool.health_check();
        if status.healthy {
            Ok(())
        } else {
            Err(TriageError::Database(
                status.message.unwrap_or_else(|| "cache database unhealthy".to_string()),
            ))
        }
    }
}

fn create_schema(conn: &rusqlite::Connection) -> Result<()> {
    conn.execute_batch(SCHEMA_SQL).map_err(to_domain)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?, CAST(strftime('%s','now') AS INTEGER))",
        params![SCHEMA_VERSION],
    )
    .map_err(to_domain)?;
    Ok(())
}
