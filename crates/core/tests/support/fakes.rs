//! In-memory implementations of the core ports.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use octotriage_common::time::{Clock, MockClock};
use octotriage_core::{NotificationStore, RemoteService, UrlOpener};
use octotriage_domain::{
    sort_facets, FacetAggregates, FacetCount, FetchFilters, Notification, NotificationId,
    NotificationPage, NotificationPatch, NotificationPayload, PinnedSearch, Result, SyncStatus,
    TriageError, UserProfile, ViewCounts, ViewFilter,
};
use parking_lot::Mutex;

/// Store backed by a map, with time from a [`MockClock`].
pub struct InMemoryStore {
    records: Mutex<BTreeMap<NotificationId, Notification>>,
    sync: Mutex<HashMap<String, SyncStatus>>,
    failing_patch: Mutex<Option<NotificationId>>,
    clock: MockClock,
}

impl InMemoryStore {
    pub fn new(clock: MockClock) -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            sync: Mutex::new(HashMap::new()),
            failing_patch: Mutex::new(None),
            clock,
        }
    }

    pub fn seeded(clock: MockClock, records: Vec<Notification>) -> Self {
        let store = Self::new(clock);
        store.records.lock().extend(records.into_iter().map(|n| (n.id, n)));
        store
    }

    pub fn snapshot(&self, id: NotificationId) -> Option<Notification> {
        self.records.lock().get(&id).cloned()
    }

    /// Make every later `patch` of `id` fail with a database error.
    pub fn fail_patches_of(&self, id: NotificationId) {
        *self.failing_patch.lock() = Some(id);
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    fn stamp(&self, resource: &str, error: Option<&str>) {
        self.sync.lock().insert(
            resource.to_string(),
            SyncStatus {
                resource: resource.to_string(),
                last_sync: self.clock.utc_now(),
                error: error.map(str::to_string),
            },
        );
    }
}

fn grouped<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<FacetCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for value in values.flatten() {
        *counts.entry(value).or_default() += 1;
    }
    let mut facets: Vec<FacetCount> =
        counts.into_iter().map(|(value, count)| FacetCount::new(value, count)).collect();
    sort_facets(&mut facets);
    facets
}

#[async_trait]
impl NotificationStore for InMemoryStore {
    async fn replace_all(&self, records: &[Notification]) -> Result<()> {
        let now = self.clock.utc_now();
        let mut map = self.records.lock();
        map.clear();
        map.extend(records.iter().map(|n| (n.id, Notification { fetched_at: now, ..n.clone() })));
        drop(map);
        self.stamp(octotriage_domain::constants::NOTIFICATIONS_RESOURCE, None);
        Ok(())
    }

    async fn upsert(&self, records: &[Notification]) -> Result<()> {
        let now = self.clock.utc_now();
        self.records
            .lock()
            .extend(records.iter().map(|n| (n.id, Notification { fetched_at: now, ..n.clone() })));
        Ok(())
    }

    async fn patch(&self, id: NotificationId, patch: NotificationPatch) -> Result<bool> {
        if *self.failing_patch.lock() == Some(id) {
            return Err(TriageError::Database("database is locked".into()));
        }
        let mut map = self.records.lock();
        let Some(record) = map.get_mut(&id) else {
            return Ok(false);
        };
        patch.apply_to(record);
        record.fetched_at = self.clock.utc_now();
        Ok(true)
    }

    async fn get(&self, id: NotificationId) -> Result<Option<Notification>> {
        Ok(self.snapshot(id))
    }

    async fn load_view(&self, view: ViewFilter) -> Result<Vec<Notification>> {
        let mut rows: Vec<Notification> =
            self.records.lock().values().filter(|n| view.matches(n)).cloned().collect();
        // `None` sorts first ascending, so reversing puts it last.
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(rows)
    }

    async fn counts(&self) -> Result<ViewCounts> {
        let map = self.records.lock();
        let count = |view: ViewFilter| map.values().filter(|n| view.matches(n)).count() as u64;
        Ok(ViewCounts {
            inbox: count(ViewFilter::Inbox),
            starred: count(ViewFilter::Starred),
            archived: count(ViewFilter::Archived),
        })
    }

    async fn facets(&self) -> Result<FacetAggregates> {
        let map = self.records.lock();
        let inbox: Vec<&Notification> = map.values().filter(|n| n.in_inbox()).collect();

        let mut repos_by_owner: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for n in &inbox {
            if let (Some(owner), Some(full)) = (n.owner(), n.repo_full_name()) {
                let short = full.split_once('/').map_or(full, |(_, name)| name).to_string();
                let repos = repos_by_owner.entry(owner.to_string()).or_default();
                if !repos.contains(&short) {
                    repos.push(short);
                }
            }
        }
        repos_by_owner.values_mut().for_each(|repos| repos.sort());

        let unread = inbox.iter().filter(|n| n.unread).count() as u64;
        let bots = inbox.iter().filter(|n| n.is_bot()).count() as u64;
        Ok(FacetAggregates {
            owners: grouped(inbox.iter().map(|n| n.owner())),
            repos: grouped(inbox.iter().map(|n| n.repo_full_name())),
            repos_by_owner,
            subject_types: grouped(inbox.iter().map(|n| n.subject_type())),
            reasons: grouped(inbox.iter().map(|n| n.reason.as_deref())),
            states: grouped(inbox.iter().map(|n| n.subject_state())),
            unread,
            read: inbox.len() as u64 - unread,
            bots,
            humans: inbox.len() as u64 - bots,
        })
    }

    async fn is_stale(&self, resource: &str, ttl: Duration) -> Result<bool> {
        let Some(status) = self.sync.lock().get(resource).cloned() else {
            return Ok(true);
        };
        let age = self.clock.utc_now() - status.last_sync;
        Ok(age.to_std().map_or(false, |age| age > ttl))
    }

    async fn mark_synced(&self, resource: &str, error: Option<&str>) -> Result<()> {
        self.stamp(resource, error);
        Ok(())
    }

    async fn last_sync(&self, resource: &str) -> Result<Option<SyncStatus>> {
        Ok(self.sync.lock().get(resource).cloned())
    }
}

/// Remote service that answers from scripted responses and records calls.
#[derive(Default)]
pub struct ScriptedRemote {
    pages: Mutex<Vec<Result<NotificationPage>>>,
    always_syncing: Mutex<bool>,
    trigger_error: Mutex<Option<TriageError>>,
    mutation_error: Mutex<Option<TriageError>>,
    pinned: Mutex<Vec<PinnedSearch>>,
    pinned_error: Mutex<Option<TriageError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `payloads` split into pages of `per_page`.
    pub fn with_payloads(self, payloads: Vec<NotificationPayload>, per_page: usize) -> Self {
        let chunks: Vec<Vec<NotificationPayload>> =
            payloads.chunks(per_page.max(1)).map(<[NotificationPayload]>::to_vec).collect();
        let total = u32::try_from(chunks.len().max(1)).unwrap_or(u32::MAX);
        let pages = chunks
            .into_iter()
            .enumerate()
            .map(|(index, notifications)| {
                Ok(NotificationPage {
                    notifications,
                    current_page: u32::try_from(index + 1).unwrap_or(u32::MAX),
                    total_pages: total,
                })
            })
            .collect();
        *self.pages.lock() = pages;
        self
    }

    pub fn with_page(self, page: Result<NotificationPage>) -> Self {
        self.pages.lock().push(page);
        self
    }

    pub fn always_syncing(self) -> Self {
        *self.always_syncing.lock() = true;
        self
    }

    pub fn failing_trigger(self, error: TriageError) -> Self {
        *self.trigger_error.lock() = Some(error);
        self
    }

    pub fn failing_mutations(self, error: TriageError) -> Self {
        *self.mutation_error.lock() = Some(error);
        self
    }

    pub fn with_pinned(self, pinned: Vec<PinnedSearch>) -> Self {
        *self.pinned.lock() = pinned;
        self
    }

    pub fn failing_pinned(self, error: TriageError) -> Self {
        *self.pinned_error.lock() = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls.lock().iter().filter(|call| call.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }

    fn mutation(&self, name: &str, ids: &[NotificationId]) -> Result<()> {
        self.record(format!("{name}:{ids:?}"));
        self.mutation_error.lock().clone().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl RemoteService for ScriptedRemote {
    async fn fetch_page(&self, page: u32, _filters: &FetchFilters) -> Result<NotificationPage> {
        self.record(format!("fetch_page:{page}"));
        let index = usize::try_from(page.saturating_sub(1)).unwrap_or(usize::MAX);
        self.pages.lock().get(index).cloned().unwrap_or_else(|| {
            Ok(NotificationPage { notifications: Vec::new(), current_page: page, total_pages: page })
        })
    }

    async fn trigger_sync(&self) -> Result<()> {
        self.record("trigger_sync".into());
        self.trigger_error.lock().clone().map_or(Ok(()), Err)
    }

    async fn is_syncing(&self) -> Result<bool> {
        self.record("is_syncing".into());
        Ok(*self.always_syncing.lock())
    }

    async fn star(&self, id: NotificationId) -> Result<()> {
        self.mutation("star", &[id])
    }

    async fn archive(&self, ids: &[NotificationId]) -> Result<()> {
        self.mutation("archive", ids)
    }

    async fn unarchive(&self, ids: &[NotificationId]) -> Result<()> {
        self.mutation("unarchive", ids)
    }

    async fn mute(&self, ids: &[NotificationId]) -> Result<()> {
        self.mutation("mute", ids)
    }

    async fn mark_read(&self, ids: &[NotificationId]) -> Result<()> {
        self.mutation("mark_read", ids)
    }

    async fn pinned_searches(&self) -> Result<Vec<PinnedSearch>> {
        self.record("pinned_searches".into());
        if let Some(err) = self.pinned_error.lock().clone() {
            return Err(err);
        }
        Ok(self.pinned.lock().clone())
    }

    async fn user_profile(&self) -> Result<UserProfile> {
        self.record("user_profile".into());
        Ok(UserProfile { id: Some(1), github_login: Some("octocat".into()) })
    }

    async fn unread_count(&self) -> Result<u64> {
        self.record("unread_count".into());
        Ok(0)
    }
}

/// Opener that remembers URLs instead of launching a browser.
#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().push(url.to_string());
        Ok(())
    }
}
