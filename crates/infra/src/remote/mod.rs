//! Octobox remote service

pub mod client;
pub mod errors;

pub use client::OctoboxClient;
pub use errors::{RemoteError, RemoteErrorCategory};
