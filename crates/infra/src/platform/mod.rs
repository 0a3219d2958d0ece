//! Platform adapters

pub mod browser;

pub use browser::SystemBrowser;
