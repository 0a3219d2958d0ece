//! Conversions from external infrastructure errors into domain errors.

use octotriage_common::storage::StorageError;
use octotriage_common::{ErrorClassification, ErrorSeverity};
use octotriage_domain::TriageError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;
use tracing::{debug, error, warn};

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub TriageError);

impl From<InfraError> for TriageError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<TriageError> for InfraError {
    fn from(value: TriageError) -> Self {
        Self(value)
    }
}

/// Convert any error with an [`InfraError`] conversion straight into the
/// domain error.
pub fn to_domain<E>(err: E) -> TriageError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

trait IntoTriageError {
    fn into_triage(self) -> TriageError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → TriageError */
/* -------------------------------------------------------------------------- */

impl IntoTriageError for SqlError {
    fn into_triage(self) -> TriageError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => TriageError::Database("database is busy".into()),
                    (ErrorCode::DatabaseLocked, _) => {
                        TriageError::Database("database is locked".into())
                    }
                    (ErrorCode::ConstraintViolation, 2067 | 1555) => {
                        TriageError::Database("unique constraint violation".into())
                    }
                    (ErrorCode::NotADatabase, _) => {
                        TriageError::Database("cache file is not a SQLite database".into())
                    }
                    _ => TriageError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => TriageError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                TriageError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                TriageError::Database(format!("invalid column type for {name}: {ty}"))
            }
            RE::InvalidPath(path) => TriageError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => TriageError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        Self(value.into_triage())
    }
}

/* -------------------------------------------------------------------------- */
/* StorageError → TriageError */
/* -------------------------------------------------------------------------- */

impl IntoTriageError for StorageError {
    fn into_triage(self) -> TriageError {
        let retryable = self.is_retryable();
        match self.severity() {
            ErrorSeverity::Critical => error!(error = %self, retryable, "storage.error"),
            ErrorSeverity::Error => warn!(error = %self, retryable, "storage.error"),
            ErrorSeverity::Warning | ErrorSeverity::Info => {
                debug!(error = %self, retryable, "storage.error");
            }
        }
        match self {
            StorageError::Rusqlite(err) => err.into_triage(),
            StorageError::Timeout(seconds) => {
                TriageError::Database(format!("database connection timeout after {seconds}s"))
            }
            StorageError::InvalidConfig(message) => TriageError::Config(message),
            other => TriageError::Database(other.to_string()),
        }
    }
}

impl From<StorageError> for InfraError {
    fn from(value: StorageError) -> Self {
        Self(value.into_triage())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TriageError */
/* -------------------------------------------------------------------------- */

impl IntoTriageError for HttpError {
    fn into_triage(self) -> TriageError {
        if self.is_timeout() {
            return TriageError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return TriageError::Network("could not connect to Octobox".into());
        }

        if self.is_decode() {
            return TriageError::Parse(self.to_string());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 => TriageError::Auth(message),
                404 => TriageError::NotFound(message),
                423 | 503 => TriageError::Busy(message),
                400..=499 => TriageError::InvalidInput(message),
                _ => TriageError::Network(message),
            };
        }

        TriageError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_triage())
    }
}

/* -------------------------------------------------------------------------- */
/* Serialization and I/O */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        Self(TriageError::Parse(value.to_string()))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        Self(TriageError::Config(format!("invalid TOML: {value}")))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(TriageError::Internal(format!("I/O error: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
