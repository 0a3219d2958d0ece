//! System browser launcher.

use std::process::{Command, Stdio};

use octotriage_core::UrlOpener;
use octotriage_domain::{Result, TriageError};
use tracing::{debug, warn};
use url::Url;

/// Opens URLs with the platform's default handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBrowser;

impl SystemBrowser {
    pub const fn new() -> Self {
        Self
    }
}

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        let parsed = validate_url(url)?;
        let (program, args) = launcher(parsed.as_str());
        debug!(program, url = %parsed, "browser.open");

        Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_| ())
            .map_err(|err| {
                warn!(program, error = %err, "failed to launch browser");
                TriageError::Internal(format!("could not launch {program}: {err}"))
            })
    }
}

/// Only web URLs are handed to the launcher.
fn validate_url(url: &str) -> Result<Url> {
    let parsed =
        Url::parse(url).map_err(|err| TriageError::InvalidInput(format!("invalid url: {err}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(TriageError::InvalidInput(format!("refusing to open '{other}' url"))),
    }
}

#[cfg(target_os = "macos")]
fn launcher(url: &str) -> (&'static str, Vec<String>) {
    ("open", vec![url.to_string()])
}

#[cfg(target_os = "windows")]
fn launcher(url: &str) -> (&'static str, Vec<String>) {
    ("cmd", vec!["/C".into(), "start".into(), String::new(), url.to_string()])
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn launcher(url: &str) -> (&'static str, Vec<String>) {
    ("xdg-open", vec![url.to_string()])
}
