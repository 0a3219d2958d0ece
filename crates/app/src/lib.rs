//! # octotriage App
//!
//! Command-line application layer.
//!
//! This crate contains:
//! - The clap command line and one handler per subcommand
//! - The line-driven interactive shell
//! - Application context (dependency injection)
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires the SQLite store and the Octobox client into the core runtime

pub mod cli;
pub mod commands;
pub mod context;
pub mod shell;
pub mod utils;

pub use cli::{Cli, CliCommand};
pub use context::AppContext;
