//! Shared fixtures for the infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use octotriage_common::time::MockClock;
use octotriage_domain::{Notification, RemoteConfig};
use octotriage_infra::{DbManager, OctoboxClient, SqliteNotificationStore};
use tempfile::TempDir;

pub const TEST_TOKEN: &str = "test-token-123";

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid timestamp")
}

/// A migrated cache database in a temporary directory.
pub struct DbHarness {
    #[allow(dead_code)]
    temp_dir: TempDir,
    pub manager: Arc<DbManager>,
    pub clock: MockClock,
}

impl DbHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temporary directory should be created");
        let db_path = temp_dir.path().join("infra-integration.db");

        let manager = Arc::new(
            DbManager::new(&db_path, 4, Duration::from_secs(5))
                .expect("database manager should initialise"),
        );
        manager.run_migrations().expect("schema migrations should apply");

        Self { temp_dir, manager, clock: MockClock::starting_at(base_time()) }
    }

    pub fn store(&self) -> SqliteNotificationStore {
        SqliteNotificationStore::new(Arc::clone(&self.manager))
            .with_clock(Arc::new(self.clock.clone()))
    }
}

/// Record `id` in `repo`, updated `id` hours before the base time.
pub fn record(id: i64, repo: &str) -> Notification {
    let mut n = Notification::new(id, base_time());
    n.updated_at = Some(base_time() - ChronoDuration::hours(id));
    n.reason = Some("mention".into());
    n.subject.title = Some(format!("Change {id}"));
    n.subject.subject_type = Some("PullRequest".into());
    n.subject.state = Some("open".into());
    n.subject.author = Some("octocat".into());
    n.repo.full_name = Some(repo.to_string());
    n.repo.owner = repo.split('/').next().map(str::to_string);
    n.web_url = Some(format!("https://github.com/{repo}/pull/{id}"));
    n
}

pub fn client_for(base_url: &str) -> OctoboxClient {
    let config = RemoteConfig {
        base_url: base_url.to_string(),
        api_token: Some(TEST_TOKEN.to_string()),
        timeout_secs: 5,
        page_size: 2,
    };
    OctoboxClient::from_config(&config).expect("client")
}
