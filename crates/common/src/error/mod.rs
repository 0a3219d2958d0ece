//! Error classification shared by the storage and remote layers.
//!
//! Module-specific errors stay as their own `thiserror` enums and implement
//! [`ErrorClassification`] so callers can decide on logging level and
//! retry behaviour without matching on every variant.

use std::fmt;
use std::time::Duration;

/// Standard interface for classifying errors by their characteristics.
pub trait ErrorClassification {
    /// Transient failure that may succeed if attempted again.
    fn is_retryable(&self) -> bool;

    /// Severity used for logging decisions.
    fn severity(&self) -> ErrorSeverity;

    /// Whether the error indicates corrupted state or a broken invariant.
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }

    /// Suggested delay before retrying, when the source provides one.
    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention
    Error,
    /// Critical, the local state may be unusable
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}
