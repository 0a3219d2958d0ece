//! Views, counts, patches, sync status and facet aggregates.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::notification::Notification;
use crate::errors::TriageError;

/// Top-level list views backed by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewFilter {
    /// Neither archived nor muted.
    #[default]
    Inbox,
    /// Starred, regardless of archive state.
    Starred,
    Archived,
    All,
}

impl ViewFilter {
    /// Views reachable as tabs, in tab order.
    pub const TABS: [Self; 3] = [Self::Inbox, Self::Starred, Self::Archived];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inbox => "inbox",
            Self::Starred => "starred",
            Self::Archived => "archived",
            Self::All => "all",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Inbox => "Inbox",
            Self::Starred => "Starred",
            Self::Archived => "Archived",
            Self::All => "All",
        }
    }

    /// Tab `delta` steps away, wrapping. `All` is treated as the inbox tab.
    pub fn cycle(self, delta: isize) -> Self {
        let len = Self::TABS.len();
        let current = Self::TABS.iter().position(|tab| *tab == self).unwrap_or(0);
        #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
        let step = delta.rem_euclid(len as isize) as usize;
        Self::TABS[(current + step) % len]
    }

    /// Whether a record belongs to this view.
    pub const fn matches(self, notification: &Notification) -> bool {
        match self {
            Self::Inbox => notification.in_inbox(),
            Self::Starred => notification.starred,
            Self::Archived => notification.archived,
            Self::All => true,
        }
    }
}

impl fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewFilter {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inbox" => Ok(Self::Inbox),
            "starred" => Ok(Self::Starred),
            "archived" => Ok(Self::Archived),
            "all" => Ok(Self::All),
            other => Err(TriageError::InvalidInput(format!("unknown view '{other}'"))),
        }
    }
}

/// Tab badge counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewCounts {
    pub inbox: u64,
    pub starred: u64,
    pub archived: u64,
}

impl ViewCounts {
    pub const fn get(&self, view: ViewFilter) -> u64 {
        match view {
            ViewFilter::Inbox => self.inbox,
            ViewFilter::Starred => self.starred,
            ViewFilter::Archived => self.archived,
            ViewFilter::All => self.inbox + self.archived,
        }
    }
}

/// Partial update of a record's status flags. `None` leaves a field alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPatch {
    pub unread: Option<bool>,
    pub archived: Option<bool>,
    pub starred: Option<bool>,
    pub muted: Option<bool>,
}

impl NotificationPatch {
    #[must_use]
    pub const fn unread(mut self, value: bool) -> Self {
        self.unread = Some(value);
        self
    }

    #[must_use]
    pub const fn archived(mut self, value: bool) -> Self {
        self.archived = Some(value);
        self
    }

    #[must_use]
    pub const fn starred(mut self, value: bool) -> Self {
        self.starred = Some(value);
        self
    }

    #[must_use]
    pub const fn muted(mut self, value: bool) -> Self {
        self.muted = Some(value);
        self
    }

    pub const fn is_empty(&self) -> bool {
        self.unread.is_none()
            && self.archived.is_none()
            && self.starred.is_none()
            && self.muted.is_none()
    }

    /// Patch restoring the fields this patch touches to their values in
    /// `current`.
    #[must_use]
    pub const fn inverse_for(&self, current: &Notification) -> Self {
        Self {
            unread: if self.unread.is_some() { Some(current.unread) } else { None },
            archived: if self.archived.is_some() { Some(current.archived) } else { None },
            starred: if self.starred.is_some() { Some(current.starred) } else { None },
            muted: if self.muted.is_some() { Some(current.muted) } else { None },
        }
    }

    pub fn apply_to(&self, notification: &mut Notification) {
        if let Some(unread) = self.unread {
            notification.unread = unread;
        }
        if let Some(archived) = self.archived {
            notification.archived = archived;
        }
        if let Some(starred) = self.starred {
            notification.starred = starred;
        }
        if let Some(muted) = self.muted {
            notification.muted = muted;
        }
    }
}

/// Last sync of a named resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStatus {
    pub resource: String,
    pub last_sync: DateTime<Utc>,
    pub error: Option<String>,
}

/// One grouped count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCount {
    pub value: String,
    pub count: u64,
}

impl FacetCount {
    pub fn new(value: impl Into<String>, count: u64) -> Self {
        Self { value: value.into(), count }
    }
}

/// Derived counts over the inbox, recomputed from the store on demand.
///
/// Grouped lists are ordered by count descending, then value ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetAggregates {
    pub owners: Vec<FacetCount>,
    /// Counts keyed by full `owner/name`.
    pub repos: Vec<FacetCount>,
    /// Short repository names per owner, sorted.
    pub repos_by_owner: BTreeMap<String, Vec<String>>,
    pub subject_types: Vec<FacetCount>,
    pub reasons: Vec<FacetCount>,
    pub states: Vec<FacetCount>,
    pub unread: u64,
    pub read: u64,
    pub bots: u64,
    pub humans: u64,
}

impl FacetAggregates {
    pub const fn total(&self) -> u64 {
        self.unread + self.read
    }

    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn repo_count(&self, full_name: &str) -> u64 {
        self.repos.iter().find(|facet| facet.value == full_name).map_or(0, |facet| facet.count)
    }

    pub fn state_count(&self, state: &str) -> u64 {
        self.states.iter().find(|facet| facet.value == state).map_or(0, |facet| facet.count)
    }
}

/// Sort grouped counts by count descending, then value ascending.
pub fn sort_facets(facets: &mut [FacetCount]) {
    facets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_cycle_wraps_both_ways() {
        assert_eq!(ViewFilter::Inbox.cycle(1), ViewFilter::Starred);
        assert_eq!(ViewFilter::Archived.cycle(1), ViewFilter::Inbox);
        assert_eq!(ViewFilter::Inbox.cycle(-1), ViewFilter::Archived);
        assert_eq!(ViewFilter::All.cycle(1), ViewFilter::Starred);
    }

    #[test]
    fn inverse_patch_captures_only_touched_fields() {
        let mut n = Notification::new(1, Utc::now());
        n.archived = false;
        n.muted = false;
        n.starred = true;

        let patch = NotificationPatch::default().muted(true).archived(true);
        let rollback = patch.inverse_for(&n);
        assert_eq!(rollback, NotificationPatch::default().muted(false).archived(false));

        patch.apply_to(&mut n);
        assert!(n.muted && n.archived && n.starred);
        rollback.apply_to(&mut n);
        assert!(!n.muted && !n.archived && n.starred);
    }

    #[test]
    fn view_parses_case_insensitively() {
        assert_eq!("Starred".parse::<ViewFilter>().expect("view"), ViewFilter::Starred);
        assert!("spam".parse::<ViewFilter>().is_err());
    }
}
