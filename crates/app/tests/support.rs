//! Shared fixtures for the app integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use octotriage_app::AppContext;
use octotriage_domain::{Config, Notification};
use tempfile::TempDir;

pub const TEST_TOKEN: &str = "test-token-123";

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid timestamp")
}

/// An application context over a temporary data directory.
pub struct AppHarness {
    pub temp_dir: TempDir,
    pub ctx: AppContext,
}

impl AppHarness {
    /// Context talking to `base_url`, or running without a token when `None`.
    pub fn new(base_url: Option<&str>) -> Self {
        let temp_dir = TempDir::new().expect("temporary directory should be created");
        let mut config = Config { data_dir: temp_dir.path().to_path_buf(), ..Config::default() };
        config.sync.poll_interval_ms = 5;
        config.sync.poll_max_attempts = 3;
        if let Some(base_url) = base_url {
            config.remote.base_url = base_url.to_string();
            config.remote.api_token = Some(TEST_TOKEN.to_string());
        }

        let ctx = AppContext::new(config).expect("context should open");
        Self { temp_dir, ctx }
    }
}

/// Record `id` in `repo`, updated `id` hours before the base time.
pub fn record(id: i64, repo: &str) -> Notification {
    let mut n = Notification::new(id, base_time());
    n.unread = true;
    n.updated_at = Some(base_time() - ChronoDuration::hours(id));
    n.reason = Some("mention".into());
    n.subject.title = Some(format!("Change {id}"));
    n.subject.subject_type = Some("PullRequest".into());
    n.repo.full_name = Some(repo.to_string());
    n.repo.owner = repo.split('/').next().map(str::to_string);
    n.web_url = Some(format!("https://github.com/{repo}/pull/{id}"));
    n
}

pub fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).expect("output should be utf-8")
}
