//! # octotriage Core
//!
//! Business logic for notification triage - no infrastructure dependencies.
//!
//! This crate contains:
//! - The query engine: search grammar parser and filter pipeline
//! - Port interfaces for the notification store and the remote service
//! - The sync engine: full resync and optimistic action reconciliation
//! - The triage state machine: a pure reducer plus its command executor
//!
//! ## Architecture Principles
//! - Only depends on `octotriage-domain` and `octotriage-common`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod query;
pub mod sync;
pub mod triage;

pub use query::{apply, parse, FilterPipeline, Query};
pub use sync::ports::{NotificationStore, RemoteService, UrlOpener};
pub use sync::{
    ResyncConfig, ResyncCoordinator, ResyncOptions, ResyncOutcome, SyncPhase, TaskQueue,
};
pub use triage::{reduce, AppState, Command, CommandExecutor, Event, Runtime};
