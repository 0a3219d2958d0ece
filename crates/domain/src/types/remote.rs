//! Wire payloads exchanged with the Octobox API and their conversion into
//! records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::notification::{Notification, NotificationId, Repository, Subject};

/// One notification as returned by `GET /api/notifications.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: NotificationId,
    /// Numeric on octobox.io, string on some self-hosted instances.
    #[serde(default)]
    pub github_id: Option<serde_json::Value>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub unread: Option<bool>,
    #[serde(default)]
    pub archived: Option<bool>,
    #[serde(default)]
    pub starred: Option<bool>,
    #[serde(default)]
    pub muted: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub last_read_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub subject: Option<SubjectPayload>,
    #[serde(default)]
    pub repo: Option<RepoPayload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub subject_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPayload {
    #[serde(default)]
    pub id: Option<i64>,
    /// Full `owner/name`.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Envelope of one page of notifications.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationPageResponse {
    #[serde(default)]
    pub notifications: Vec<NotificationPayload>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// A page of notifications with the cursor resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPage {
    pub notifications: Vec<NotificationPayload>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl NotificationPage {
    /// Resolve the pagination block. A missing `current_page` falls back to
    /// the requested page and a missing `total_pages` means this is the last.
    pub fn from_response(requested_page: u32, response: NotificationPageResponse) -> Self {
        let pagination = response.pagination.unwrap_or_default();
        let current_page = pagination.current_page.unwrap_or(requested_page);
        Self {
            notifications: response.notifications,
            current_page,
            total_pages: pagination.total_pages.unwrap_or(current_page),
        }
    }

    /// True when the fetch loop should stop after this page.
    pub fn is_last(&self) -> bool {
        self.notifications.is_empty() || self.current_page >= self.total_pages
    }
}

/// Filters accepted by the page fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchFilters {
    pub starred: Option<bool>,
    pub archived: Option<bool>,
    pub query: Option<String>,
}

/// A saved query defined on the server, resolved locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedSearch {
    pub name: String,
    #[serde(rename = "query")]
    pub raw_query: String,
    #[serde(default, rename = "count")]
    pub remote_count: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinnedSearchesResponse {
    #[serde(default)]
    pub pinned_searches: Vec<PinnedSearch>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub github_login: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfileResponse {
    pub user: UserProfile,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

fn parse_timestamp(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.and_then(|raw| DateTime::parse_from_rfc3339(raw).ok()).map(|ts| ts.with_timezone(&Utc))
}

impl Notification {
    /// Convert a wire payload, stamping `fetched_at`. Unparsable timestamps
    /// become `None`.
    pub fn from_payload(payload: NotificationPayload, fetched_at: DateTime<Utc>) -> Self {
        let subject = payload.subject.unwrap_or_default();
        let repo = payload.repo.unwrap_or_default();
        let github_id = payload.github_id.and_then(|value| match value {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        });

        Self {
            id: payload.id,
            github_id,
            reason: payload.reason,
            unread: payload.unread.unwrap_or(false),
            archived: payload.archived.unwrap_or(false),
            starred: payload.starred.unwrap_or(false),
            muted: payload.muted.unwrap_or(false),
            url: payload.url,
            web_url: payload.web_url,
            subject: Subject {
                title: subject.title,
                url: subject.url,
                subject_type: subject.subject_type,
                state: subject.state,
                author: subject.author,
            },
            repo: Repository {
                id: repo.id,
                full_name: repo.name,
                owner: repo.owner,
                url: repo.repo_url,
            },
            created_at: parse_timestamp(payload.created_at.as_deref()),
            updated_at: parse_timestamp(payload.updated_at.as_deref()),
            last_read_at: parse_timestamp(payload.last_read_at.as_deref()),
            fetched_at,
        }
    }
}
