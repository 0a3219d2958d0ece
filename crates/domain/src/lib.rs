//! # octotriage Domain
//!
//! Notification triage domain types for octotriage.
//!
//! This crate contains:
//! - The notification record and its subject/repository sub-records
//! - Remote payload DTOs and their conversion into records
//! - View, patch, facet and sidebar types shared by the query and sync engines
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other octotriage crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
