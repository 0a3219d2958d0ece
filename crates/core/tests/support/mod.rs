//! Shared fixtures for the core integration tests.

#![allow(dead_code)]

pub mod fakes;

use chrono::{DateTime, Duration, TimeZone, Utc};
use octotriage_domain::{Notification, NotificationPayload, RepoPayload, SubjectPayload};

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).single().expect("valid timestamp")
}

/// A minimal record builder.
pub struct NotificationBuilder {
    inner: Notification,
}

impl NotificationBuilder {
    pub fn new(id: i64) -> Self {
        let mut inner = Notification::new(id, base_time());
        inner.updated_at = Some(base_time() - Duration::hours(id));
        inner.unread = true;
        Self { inner }
    }

    pub fn repo(mut self, full_name: &str) -> Self {
        self.inner.repo.full_name = Some(full_name.to_string());
        self.inner.repo.owner = full_name.split('/').next().map(str::to_string);
        self
    }

    pub fn kind(mut self, subject_type: &str) -> Self {
        self.inner.subject.subject_type = Some(subject_type.to_string());
        self
    }

    pub fn title(mut self, title: &str) -> Self {
        self.inner.subject.title = Some(title.to_string());
        self
    }

    pub fn read(mut self) -> Self {
        self.inner.unread = false;
        self
    }

    pub fn starred(mut self) -> Self {
        self.inner.starred = true;
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.inner.subject.author = Some(author.to_string());
        self
    }

    pub fn build(self) -> Notification {
        self.inner
    }
}

pub fn payload(id: i64, repo: &str) -> NotificationPayload {
    NotificationPayload {
        id,
        reason: Some("mention".into()),
        unread: Some(true),
        web_url: Some(format!("https://github.com/{repo}/pull/{id}")),
        updated_at: Some((base_time() - Duration::minutes(id)).to_rfc3339()),
        subject: Some(SubjectPayload {
            title: Some(format!("Change {id}")),
            subject_type: Some("PullRequest".into()),
            state: Some("open".into()),
            author: Some("octocat".into()),
            ..SubjectPayload::default()
        }),
        repo: Some(RepoPayload {
            name: Some(repo.to_string()),
            owner: repo.split('/').next().map(str::to_string),
            ..RepoPayload::default()
        }),
        ..NotificationPayload::default()
    }
}
