//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for octotriage
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum TriageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// The remote service rejected the bearer credential (HTTP 401).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The remote resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote service is busy, usually because a sync job is running
    /// (HTTP 423/503).
    #[error("Service busy: {0}")]
    Busy(String),

    /// A remote payload could not be decoded.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TriageError {
    /// Short message suitable for the UI error field.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(_) => {
                "Authentication failed. Check your Octobox API token.".to_string()
            }
            Self::Busy(_) => "Octobox is busy syncing. Try again shortly.".to_string(),
            Self::NotFound(detail) => format!("Not found: {detail}"),
            Self::Network(detail) => format!("Network error: {detail}"),
            Self::Parse(detail) => format!("Unexpected response from Octobox: {detail}"),
            other => other.to_string(),
        }
    }

    /// Whether this error means the remote sync job is already running.
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

/// Result type alias for octotriage operations
pub type Result<T> = std::result::Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = TriageError::Busy("sync running".into());
        let json = serde_json::to_string(&err).expect("serialize");
        assert_eq!(json, r#"{"type":"Busy","message":"sync running"}"#);
    }

    #[test]
    fn user_message_hides_auth_detail() {
        let err = TriageError::Auth("401 from https://octobox.io/api".into());
        assert!(!err.user_message().contains("401"));
        assert!(err.user_message().contains("token"));
    }
}
