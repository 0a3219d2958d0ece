//! # octotriage Infrastructure
//!
//! Infrastructure implementations of the core ports.
//!
//! This crate contains:
//! - The SQLite notification store and its schema
//! - The retrying HTTP client and the Octobox API client
//! - Configuration loading and the API token file
//! - Logging initialisation
//! - The system browser launcher
//!
//! ## Architecture
//! - Implements traits defined in `octotriage-core`
//! - Contains all "impure" code (I/O, network, processes)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod observability;
pub mod platform;
pub mod remote;

// Re-export commonly used items
pub use database::{DbManager, SqliteNotificationStore};
pub use errors::InfraError;
pub use http::HttpClient;
pub use observability::{init_logging, LogGuard};
pub use platform::SystemBrowser;
pub use remote::{OctoboxClient, RemoteError};
