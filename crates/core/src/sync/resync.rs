//! Full resync: trigger, bounded poll, paginated fetch, atomic replace.

use std::sync::Arc;
use std::time::Duration;

use octotriage_common::time::{Clock, SystemClock};
use octotriage_domain::constants::NOTIFICATIONS_RESOURCE;
use octotriage_domain::{
    FacetAggregates, FetchFilters, Notification, NotificationPayload, PinnedSearch, Result,
    SyncConfig,
};
use tracing::{debug, info, warn};

use super::ports::{NotificationStore, RemoteService};

/// Observable resync state. `Error` always returns to `Idle` on the next run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Triggering,
    Polling { attempt: u32 },
    Fetching { page: u32 },
    Replacing { count: usize },
    Error(String),
}

impl SyncPhase {
    /// Whether the phase is part of a running resync.
    pub const fn is_active(&self) -> bool {
        !matches!(self, Self::Idle | Self::Error(_))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResyncOptions {
    /// Ask the server to sync with GitHub first and wait for it.
    pub trigger_remote: bool,
}

impl ResyncOptions {
    pub const fn refresh() -> Self {
        Self { trigger_remote: false }
    }

    pub const fn with_github() -> Self {
        Self { trigger_remote: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResyncConfig {
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
    pub cache_ttl: Duration,
}

impl Default for ResyncConfig {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for ResyncConfig {
    fn from(config: &SyncConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            poll_max_attempts: config.poll_max_attempts,
            cache_ttl: config.cache_ttl(),
        }
    }
}

/// Result of a completed resync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncOutcome {
    pub fetched: usize,
    /// `None` when the pinned-search refresh failed.
    pub pinned_searches: Option<Vec<PinnedSearch>>,
    pub facets: FacetAggregates,
    pub poll_attempts: u32,
    /// The poll budget ran out before the server reported idle.
    pub remote_still_syncing: bool,
}

/// Drives a full resync against a store and a remote service.
#[derive(Clone)]
pub struct ResyncCoordinator {
    store: Arc<dyn NotificationStore>,
    remote: Arc<dyn RemoteService>,
    clock: Arc<dyn Clock>,
    config: ResyncConfig,
}

impl ResyncCoordinator {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        remote: Arc<dyn RemoteService>,
        config: ResyncConfig,
    ) -> Self {
        Self { store, remote, clock: Arc::new(SystemClock), config }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub const fn config(&self) -> &ResyncConfig {
        &self.config
    }

    /// Whether the cached notifications are older than the configured ttl.
    pub async fn is_stale(&self) -> Result<bool> {
        self.store.is_stale(NOTIFICATIONS_RESOURCE, self.config.cache_ttl).await
    }

    /// Run one resync, reporting each phase to `on_phase`.
    ///
    /// A fetch failure leaves the store untouched and is returned after an
    /// `Error` phase is reported.
    pub async fn run<F>(&self, options: ResyncOptions, on_phase: F) -> Result<ResyncOutcome>
    where
        F: Fn(SyncPhase) + Send + Sync,
    {
        let mut outcome = ResyncOutcome::default();

        if options.trigger_remote {
            on_phase(SyncPhase::Triggering);
            self.trigger().await;
            let (attempts, still_syncing) = self.poll(&on_phase).await;
            outcome.poll_attempts = attempts;
            outcome.remote_still_syncing = still_syncing;
        }

        let payloads = match self.fetch_all(&on_phase).await {
            Ok(payloads) => payloads,
            Err(err) => {
                warn!(error = %err, "notification fetch failed; keeping cached records");
                on_phase(SyncPhase::Error(err.user_message()));
                return Err(err);
            }
        };

        let fetched_at = self.clock.utc_now();
        let records: Vec<Notification> = payloads
            .into_iter()
            .map(|payload| Notification::from_payload(payload, fetched_at))
            .collect();

        on_phase(SyncPhase::Replacing { count: records.len() });
        if let Err(err) = self.store.replace_all(&records).await {
            on_phase(SyncPhase::Error(err.user_message()));
            return Err(err);
        }
        outcome.fetched = records.len();

        outcome.pinned_searches = match self.remote.pinned_searches().await {
            Ok(pinned) => Some(pinned),
            Err(err) => {
                warn!(error = %err, "pinned search refresh failed");
                None
            }
        };

        outcome.facets = match self.store.facets().await {
            Ok(facets) => facets,
            Err(err) => {
                on_phase(SyncPhase::Error(err.user_message()));
                return Err(err);
            }
        };

        info!(
            fetched = outcome.fetched,
            poll_attempts = outcome.poll_attempts,
            remote_still_syncing = outcome.remote_still_syncing,
            "resync.completed"
        );
        on_phase(SyncPhase::Idle);
        Ok(outcome)
    }

    async fn trigger(&self) {
        match self.remote.trigger_sync().await {
            Ok(()) => debug!("remote sync triggered"),
            Err(err) if err.is_busy() => info!("remote sync already running"),
            Err(err) => warn!(error = %err, "remote sync trigger failed; polling anyway"),
        }
    }

    /// Poll until the server reports idle or the attempt budget runs out.
    /// Returns the attempts used and whether the server still looked busy.
    async fn poll<F>(&self, on_phase: &F) -> (u32, bool)
    where
        F: Fn(SyncPhase) + Send + Sync,
    {
        for attempt in 1..=self.config.poll_max_attempts {
            on_phase(SyncPhase::Polling { attempt });
            match self.remote.is_syncing().await {
                Ok(false) => return (attempt, false),
                Ok(true) => {}
                Err(err) => {
                    warn!(error = %err, attempt, "sync status poll failed; fetching anyway");
                    return (attempt, false);
                }
            }
            if attempt < self.config.poll_max_attempts {
                tokio::time::sleep(self.config.poll_interval).await;
            }
        }
        warn!(attempts = self.config.poll_max_attempts, "remote sync still running; fetching anyway");
        (self.config.poll_max_attempts, true)
    }

    async fn fetch_all<F>(&self, on_phase: &F) -> Result<Vec<NotificationPayload>>
    where
        F: Fn(SyncPhase) + Send + Sync,
    {
        let filters = FetchFilters::default();
        let mut payloads = Vec::new();
        let mut page = 1;
        loop {
            on_phase(SyncPhase::Fetching { page });
            let response = self.remote.fetch_page(page, &filters).await?;
            let last = response.is_last();
            debug!(page, records = response.notifications.len(), last, "fetched notification page");
            payloads.extend(response.notifications);
            if last {
                return Ok(payloads);
            }
            page += 1;
        }
    }
}

impl std::fmt::Debug for ResyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResyncCoordinator").field("config", &self.config).finish_non_exhaustive()
    }
}
