use std::time::Duration;

use octotriage_domain::TriageError;
use tracing::{info, warn};

/// Log that a CLI command is starting.
///
/// `command` must be a stable identifier such as `"star"`; never pass
/// tokens or other user-supplied values.
#[inline]
pub fn log_command_start(command: &str) {
    info!(command, "command.start");
}

/// Log a successful command with its duration.
#[inline]
pub fn log_command_ok(command: &str, elapsed: Duration) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    info!(command, duration_ms, "command.ok");
}

/// Log a failed command with a stable error label. Failures reported through
/// the triage state carry no typed error and are labelled `reported`.
#[inline]
pub fn log_command_error(command: &str, elapsed: Duration, error: &anyhow::Error) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    let error_type = error.downcast_ref::<TriageError>().map_or("reported", error_label);
    warn!(command, duration_ms, error_type, error = %error, "command.error");
}

/// Convert a `TriageError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &TriageError) -> &'static str {
    match error {
        TriageError::Database(_) => "database",
        TriageError::Config(_) => "config",
        TriageError::Network(_) => "network",
        TriageError::Auth(_) => "auth",
        TriageError::NotFound(_) => "not_found",
        TriageError::Busy(_) => "busy",
        TriageError::Parse(_) => "parse",
        TriageError::InvalidInput(_) => "invalid_input",
        TriageError::Internal(_) => "internal",
    }
}
