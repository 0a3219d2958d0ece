//! Logging initialisation.
//!
//! A terminal front end owns stdout, so log lines go to a daily-rolling file
//! under the log directory through a non-blocking writer.

use std::path::{Path, PathBuf};

use octotriage_domain::constants::LOG_FILE_PREFIX;
use octotriage_domain::{LoggingConfig, Result, TriageError};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::errors::conversions::to_domain;

/// Keeps the background log writer alive. Dropping it flushes pending lines.
#[derive(Debug)]
pub struct LogGuard {
    _worker: WorkerGuard,
    directory: PathBuf,
}

impl LogGuard {
    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

/// Install the global subscriber writing into `directory`.
///
/// `RUST_LOG` wins over the configured level when set.
///
/// # Errors
/// Returns an error if the directory cannot be created or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, directory: &Path) -> Result<LogGuard> {
    std::fs::create_dir_all(directory).map_err(to_domain)?;

    let appender = tracing_appender::rolling::daily(directory, LOG_FILE_PREFIX);
    let (writer, worker) = tracing_appender::non_blocking(appender);
    let filter = env_filter(config);

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt::layer().json().with_writer(writer).with_ansi(false)).try_init()
    } else {
        registry.with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true)).try_init()
    };
    installed.map_err(|err| TriageError::Internal(format!("logging already initialised: {err}")))?;

    tracing::info!(
        directory = %directory.display(),
        level = %config.level,
        json = config.json,
        "logging initialised"
    );

    Ok(LogGuard { _worker: worker, directory: directory.to_path_buf() })
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
