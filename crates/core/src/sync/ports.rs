//! Port interfaces for the local store and the remote service

use std::time::Duration;

use async_trait::async_trait;
use octotriage_domain::{
    FacetAggregates, FetchFilters, Notification, NotificationId, NotificationPage,
    NotificationPatch, PinnedSearch, Result, SyncStatus, UserProfile, ViewCounts, ViewFilter,
};

/// Persistent keyed collection of notifications plus per-resource sync
/// status.
///
/// Writes (`replace_all`, `upsert`, `patch`) are atomic with respect to
/// concurrent readers.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Discard every record, insert `records` and stamp the notifications
    /// resource as synced, in one transaction.
    async fn replace_all(&self, records: &[Notification]) -> Result<()>;

    /// Insert or update each record by id.
    async fn upsert(&self, records: &[Notification]) -> Result<()>;

    /// Apply a partial field update. Returns `false` when the id is unknown.
    async fn patch(&self, id: NotificationId, patch: NotificationPatch) -> Result<bool>;

    async fn get(&self, id: NotificationId) -> Result<Option<Notification>>;

    /// Records in `view`, most recently updated first.
    async fn load_view(&self, view: ViewFilter) -> Result<Vec<Notification>>;

    async fn counts(&self) -> Result<ViewCounts>;

    /// Facet aggregates over the inbox.
    async fn facets(&self) -> Result<FacetAggregates>;

    /// True when `resource` was never synced or was synced more than `ttl` ago.
    async fn is_stale(&self, resource: &str, ttl: Duration) -> Result<bool>;

    async fn mark_synced(&self, resource: &str, error: Option<&str>) -> Result<()>;

    async fn last_sync(&self, resource: &str) -> Result<Option<SyncStatus>>;
}

/// Operations consumed from the Octobox API.
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Fetch one page (1-based) of notifications.
    async fn fetch_page(&self, page: u32, filters: &FetchFilters) -> Result<NotificationPage>;

    /// Ask the server to start syncing with GitHub. A busy error means a job
    /// is already running.
    async fn trigger_sync(&self) -> Result<()>;

    /// Whether a server-side sync job is running.
    async fn is_syncing(&self) -> Result<bool>;

    /// Toggle the star on one notification.
    async fn star(&self, id: NotificationId) -> Result<()>;

    async fn archive(&self, ids: &[NotificationId]) -> Result<()>;

    async fn unarchive(&self, ids: &[NotificationId]) -> Result<()>;

    async fn mute(&self, ids: &[NotificationId]) -> Result<()>;

    async fn mark_read(&self, ids: &[NotificationId]) -> Result<()>;

    async fn pinned_searches(&self) -> Result<Vec<PinnedSearch>>;

    async fn user_profile(&self) -> Result<UserProfile>;

    async fn unread_count(&self) -> Result<u64>;
}

/// Hands a URL to the system browser.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}
