//! Octobox API error taxonomy

use std::time::Duration;

use octotriage_domain::TriageError;
use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classes of remote failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorCategory {
    /// The bearer token was rejected.
    Authentication,
    /// The resource does not exist.
    Missing,
    /// A server-side sync job holds the feed.
    Busy,
    /// Any other non-2xx response.
    Api,
    /// Connection failures and timeouts.
    Network,
    /// A 2xx response whose body did not decode.
    Decode,
}

/// Errors from the Octobox HTTP API.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("unauthorized: check your API token ({0})")]
    Auth(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("service busy (sync in progress?): {0}")]
    Busy(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout after {0:?}")]
    Timeout(Duration),

    #[error("could not decode response: {0}")]
    Decode(String),
}

impl RemoteError {
    pub const fn category(&self) -> RemoteErrorCategory {
        match self {
            Self::Auth(_) => RemoteErrorCategory::Authentication,
            Self::NotFound(_) => RemoteErrorCategory::Missing,
            Self::Busy(_) => RemoteErrorCategory::Busy,
            Self::Api { .. } => RemoteErrorCategory::Api,
            Self::Network(_) | Self::Timeout(_) => RemoteErrorCategory::Network,
            Self::Decode(_) => RemoteErrorCategory::Decode,
        }
    }

    /// Classify a non-2xx response.
    pub fn from_status(status: StatusCode, path: &str, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("{path} returned status {status}")
        } else {
            format!("{path} returned status {status}: {}", body.trim())
        };

        match status {
            StatusCode::UNAUTHORIZED => Self::Auth(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::LOCKED | StatusCode::SERVICE_UNAVAILABLE => Self::Busy(message),
            other => Self::Api { status: other.as_u16(), message },
        }
    }
}

impl From<RemoteError> for TriageError {
    fn from(err: RemoteError) -> Self {
        let message = err.to_string();
        match err.category() {
            RemoteErrorCategory::Authentication => Self::Auth(message),
            RemoteErrorCategory::Missing => Self::NotFound(message),
            RemoteErrorCategory::Busy => Self::Busy(message),
            RemoteErrorCategory::Api | RemoteErrorCategory::Network => Self::Network(message),
            RemoteErrorCategory::Decode => Self::Parse(message),
        }
    }
}
