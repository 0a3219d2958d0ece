//! The notification record and its sub-records.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a notification. Globally unique and the store's primary key.
pub type NotificationId = i64;

/// One notification as mirrored in the local store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub github_id: Option<String>,
    pub reason: Option<String>,
    pub unread: bool,
    pub archived: bool,
    pub starred: bool,
    pub muted: bool,
    pub url: Option<String>,
    pub web_url: Option<String>,
    pub subject: Subject,
    pub repo: Repository,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_read_at: Option<DateTime<Utc>>,
    /// Local write timestamp, refreshed on every store write.
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub title: Option<String>,
    pub url: Option<String>,
    /// Raw subject type as reported by the remote service (`PullRequest`, ...).
    pub subject_type: Option<String>,
    pub state: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: Option<i64>,
    /// `owner/name`
    pub full_name: Option<String>,
    pub owner: Option<String>,
    pub url: Option<String>,
}

/// Known subject types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubjectType {
    PullRequest,
    Issue,
    Release,
    Commit,
    Discussion,
    CheckSuite,
}

impl SubjectType {
    pub const ALL: [Self; 6] = [
        Self::PullRequest,
        Self::Issue,
        Self::Release,
        Self::Commit,
        Self::Discussion,
        Self::CheckSuite,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PullRequest => "PullRequest",
            Self::Issue => "Issue",
            Self::Release => "Release",
            Self::Commit => "Commit",
            Self::Discussion => "Discussion",
            Self::CheckSuite => "CheckSuite",
        }
    }

    /// Resolve a user-typed alias (`pr`, `pull_request`, `check_suite`, ...).
    pub fn from_alias(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "pr" | "pullrequest" | "pull_request" => Some(Self::PullRequest),
            "issue" => Some(Self::Issue),
            "release" => Some(Self::Release),
            "commit" => Some(Self::Commit),
            "discussion" => Some(Self::Discussion),
            "checksuite" | "check_suite" => Some(Self::CheckSuite),
            _ => None,
        }
    }

    /// Exact match on the remote service's spelling.
    pub fn from_remote(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PullRequest => "[PR]",
            Self::Issue => "[IS]",
            Self::Release => "[RL]",
            Self::Commit => "[CM]",
            Self::Discussion => "[DS]",
            Self::CheckSuite => "[CI]",
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subject states shown in the sidebar, in display order.
pub const SUBJECT_STATES: [&str; 3] = ["open", "merged", "closed"];

/// Bot classification on the subject author.
///
/// An author is a bot when it contains `[bot]` or ends with `-bot`
/// (case-insensitive). A missing or empty author is human.
pub fn is_bot_author(author: Option<&str>) -> bool {
    match author {
        Some(author) if !author.is_empty() => {
            let author = author.to_lowercase();
            author.contains("[bot]") || author.ends_with("-bot")
        }
        _ => false,
    }
}

impl Notification {
    /// Minimal unread inbox record, used as a starting point by builders and tests.
    pub fn new(id: NotificationId, fetched_at: DateTime<Utc>) -> Self {
        Self {
            id,
            github_id: None,
            reason: None,
            unread: true,
            archived: false,
            starred: false,
            muted: false,
            url: None,
            web_url: None,
            subject: Subject::default(),
            repo: Repository::default(),
            created_at: None,
            updated_at: None,
            last_read_at: None,
            fetched_at,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.subject.title.as_deref()
    }

    pub fn repo_full_name(&self) -> Option<&str> {
        self.repo.full_name.as_deref()
    }

    pub fn owner(&self) -> Option<&str> {
        self.repo.owner.as_deref()
    }

    pub fn subject_type(&self) -> Option<&str> {
        self.subject.subject_type.as_deref()
    }

    pub fn subject_state(&self) -> Option<&str> {
        self.subject.state.as_deref()
    }

    pub fn is_bot(&self) -> bool {
        is_bot_author(self.subject.author.as_deref())
    }

    /// Neither archived nor muted.
    pub const fn in_inbox(&self) -> bool {
        !self.archived && !self.muted
    }

    /// Title, repository, owner and reason joined by single spaces, skipping
    /// missing fields.
    pub fn search_text(&self) -> String {
        [self.title(), self.repo_full_name(), self.owner(), self.reason.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn type_label(&self) -> &'static str {
        self.subject_type().and_then(SubjectType::from_remote).map_or("[??]", SubjectType::label)
    }

    pub fn reason_icon(&self) -> &'static str {
        match self.reason.as_deref() {
            Some("review_requested") => "\u{25cf}",
            Some("author") => "\u{25c6}",
            Some("mention") => "\u{25cb}",
            Some("subscribed" | "manual") => "\u{25c7}",
            Some("assign") => "\u{25c8}",
            Some("ci_activity") => "\u{26a1}",
            Some("state_change") => "\u{21bb}",
            Some("comment") => "\u{2709}",
            _ => " ",
        }
    }

    pub fn display_ref(&self) -> &str {
        self.repo_full_name().unwrap_or("unknown")
    }

    pub fn display_status(&self) -> String {
        let mut indicators = Vec::new();
        if self.starred {
            indicators.push("\u{2605}");
        }
        if self.muted {
            indicators.push("MUTED");
        }
        indicators.join(" ")
    }

    /// Compact age of the last update relative to `now`: `42s`, `5m`, `3h`, `2d`.
    pub fn age(&self, now: DateTime<Utc>) -> String {
        let Some(updated_at) = self.updated_at else {
            return "?".to_string();
        };
        let seconds = (now - updated_at).num_seconds().max(0);
        match seconds {
            0..=59 => format!("{seconds}s"),
            60..=3_599 => format!("{}m", seconds / 60),
            3_600..=86_399 => format!("{}h", seconds / 3_600),
            _ => format!("{}d", seconds / 86_400),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn sample() -> Notification {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut n = Notification::new(7, now);
        n.reason = Some("mention".into());
        n.subject.title = Some("Fix the parser".into());
        n.subject.subject_type = Some("PullRequest".into());
        n.repo.full_name = Some("octobox/octobox".into());
        n.repo.owner = Some("octobox".into());
        n.updated_at = Some(now - Duration::minutes(5));
        n
    }

    #[test]
    fn search_text_joins_present_fields() {
        let mut n = sample();
        assert_eq!(n.search_text(), "Fix the parser octobox/octobox octobox mention");
        n.repo.owner = None;
        n.reason = None;
        assert_eq!(n.search_text(), "Fix the parser octobox/octobox");
    }

    #[test]
    fn bot_rule_uses_subject_author_only() {
        assert!(is_bot_author(Some("dependabot[bot]")));
        assert!(is_bot_author(Some("Renovate-Bot")));
        assert!(!is_bot_author(Some("botanist")));
        assert!(!is_bot_author(Some("")));
        assert!(!is_bot_author(None));

        let mut n = sample();
        n.repo.owner = Some("github-actions[bot]".into());
        assert!(!n.is_bot());
    }

    #[test]
    fn labels_and_age() {
        let n = sample();
        assert_eq!(n.type_label(), "[PR]");
        assert_eq!(n.reason_icon(), "\u{25cb}");
        assert_eq!(n.age(n.fetched_at), "5m");

        let mut unknown = sample();
        unknown.subject.subject_type = Some("Gist".into());
        unknown.updated_at = None;
        assert_eq!(unknown.type_label(), "[??]");
        assert_eq!(unknown.age(unknown.fetched_at), "?");
    }

    #[test]
    fn subject_type_aliases() {
        assert_eq!(SubjectType::from_alias("PR"), Some(SubjectType::PullRequest));
        assert_eq!(SubjectType::from_alias("check_suite"), Some(SubjectType::CheckSuite));
        assert_eq!(SubjectType::from_alias("gist"), None);
    }
}
