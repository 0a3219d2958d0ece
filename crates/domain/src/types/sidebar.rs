//! Structural (sidebar) filters and sidebar items.

use serde::{Deserialize, Serialize};

use super::notification::Notification;
use super::view::ViewFilter;

/// Single-valued filter picked from the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StructuralFilter {
    Owner(String),
    Repo(String),
    Reason(String),
    SubjectType(String),
    State(String),
    Unread(bool),
    Bot(bool),
}

impl StructuralFilter {
    /// Exact field equality; `Bot` uses the subject-author bot rule.
    pub fn matches(&self, notification: &Notification) -> bool {
        match self {
            Self::Owner(owner) => notification.owner() == Some(owner.as_str()),
            Self::Repo(repo) => notification.repo_full_name() == Some(repo.as_str()),
            Self::Reason(reason) => notification.reason.as_deref() == Some(reason.as_str()),
            Self::SubjectType(kind) => notification.subject_type() == Some(kind.as_str()),
            Self::State(state) => notification.subject_state() == Some(state.as_str()),
            Self::Unread(unread) => notification.unread == *unread,
            Self::Bot(bot) => notification.is_bot() == *bot,
        }
    }
}

/// One row of the sidebar. Each variant carries only what it renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SidebarItem {
    Header { label: String },
    Separator,
    Tab { view: ViewFilter, count: u64 },
    Pinned { name: String, raw_query: String, count: u64 },
    Owner { owner: String, count: u64 },
    Repo { full_name: String, short_name: String, count: u64 },
    Reason { reason: String, count: u64 },
    SubjectType { name: String, count: u64 },
    State { state: String, count: u64 },
    Unread { unread: bool, count: u64 },
    Bot { bot: bool, count: u64 },
}

impl SidebarItem {
    pub fn header(label: impl Into<String>) -> Self {
        Self::Header { label: label.into() }
    }

    /// Headers and separators cannot be activated.
    pub const fn is_selectable(&self) -> bool {
        !matches!(self, Self::Header { .. } | Self::Separator)
    }

    /// Nested under a parent row (repositories under their owner).
    pub const fn is_indented(&self) -> bool {
        matches!(self, Self::Repo { .. })
    }

    pub fn label(&self) -> String {
        match self {
            Self::Header { label } => label.clone(),
            Self::Separator => String::new(),
            Self::Tab { view, .. } => view.label().to_string(),
            Self::Pinned { name, .. } => name.clone(),
            Self::Owner { owner, .. } => owner.clone(),
            Self::Repo { short_name, .. } => short_name.clone(),
            Self::Reason { reason, .. } => reason.replace('_', " "),
            Self::SubjectType { name, .. } => name.clone(),
            Self::State { state, .. } => capitalize(state),
            Self::Unread { unread, .. } => if *unread { "Unread" } else { "Read" }.to_string(),
            Self::Bot { bot, .. } => if *bot { "Bots" } else { "Humans" }.to_string(),
        }
    }

    pub const fn count(&self) -> Option<u64> {
        match self {
            Self::Header { .. } | Self::Separator => None,
            Self::Tab { count, .. }
            | Self::Pinned { count, .. }
            | Self::Owner { count, .. }
            | Self::Repo { count, .. }
            | Self::Reason { count, .. }
            | Self::SubjectType { count, .. }
            | Self::State { count, .. }
            | Self::Unread { count, .. }
            | Self::Bot { count, .. } => Some(*count),
        }
    }

    /// The structural filter this row applies, for filter rows.
    pub fn structural_filter(&self) -> Option<StructuralFilter> {
        match self {
            Self::Owner { owner, .. } => Some(StructuralFilter::Owner(owner.clone())),
            Self::Repo { full_name, .. } => Some(StructuralFilter::Repo(full_name.clone())),
            Self::Reason { reason, .. } => Some(StructuralFilter::Reason(reason.clone())),
            Self::SubjectType { name, .. } => Some(StructuralFilter::SubjectType(name.clone())),
            Self::State { state, .. } => Some(StructuralFilter::State(state.clone())),
            Self::Unread { unread, .. } => Some(StructuralFilter::Unread(*unread)),
            Self::Bot { bot, .. } => Some(StructuralFilter::Bot(*bot)),
            Self::Header { .. } | Self::Separator | Self::Tab { .. } | Self::Pinned { .. } => None,
        }
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}
