//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use octotriage_common::time::{Clock, SystemClock};
use octotriage_core::{
    AppState, CommandExecutor, NotificationStore, RemoteService, ResyncConfig, ResyncCoordinator,
    Runtime, UrlOpener,
};
use octotriage_domain::{
    Config, FetchFilters, NotificationId, NotificationPage, PinnedSearch, Result, TriageError,
    UserProfile,
};
use octotriage_infra::{DbManager, OctoboxClient, SqliteNotificationStore, SystemBrowser};
use tracing::{info, warn};

/// Type alias for notification store port trait object
type DynNotificationStore = dyn NotificationStore + 'static;

/// Type alias for remote service port trait object
type DynRemoteService = dyn RemoteService + 'static;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub store: Arc<DynNotificationStore>,
    pub remote: Arc<DynRemoteService>,
    pub opener: Arc<dyn UrlOpener>,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Open the cache database and build the Octobox client from `config`.
    ///
    /// Without an API token the context still opens, so cached views stay
    /// readable; every remote call then fails with [`TriageError::Auth`].
    pub fn new(config: Config) -> Result<Self> {
        let db = Arc::new(DbManager::open_migrated(
            config.database_path(),
            config.database.pool_size,
            Duration::from_millis(config.database.busy_timeout_ms),
        )?);
        let store: Arc<DynNotificationStore> =
            Arc::new(SqliteNotificationStore::new(Arc::clone(&db)));

        let remote: Arc<DynRemoteService> = if config.has_token() {
            Arc::new(OctoboxClient::from_config(&config.remote)?)
        } else {
            warn!("no API token configured; running from the local cache only");
            Arc::new(UnconfiguredRemote)
        };

        info!(
            data_dir = %config.data_dir.display(),
            base_url = %config.remote.base_url,
            "application context ready"
        );

        Ok(Self {
            config,
            db,
            store,
            remote,
            opener: Arc::new(SystemBrowser::new()),
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the remote service, e.g. with a client pointed at a test server.
    #[must_use]
    pub fn with_remote(mut self, remote: Arc<DynRemoteService>) -> Self {
        self.remote = remote;
        self
    }

    #[must_use]
    pub fn with_opener(mut self, opener: Arc<dyn UrlOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn coordinator(&self) -> ResyncCoordinator {
        ResyncCoordinator::new(
            Arc::clone(&self.store),
            Arc::clone(&self.remote),
            ResyncConfig::from(&self.config.sync),
        )
        .with_clock(Arc::clone(&self.clock))
    }

    /// Fresh state with the configured probe interval.
    pub fn initial_state(&self) -> AppState {
        AppState::new(self.config.sync.probe_interval())
    }

    /// A runtime over `state`, wired to this context's ports.
    pub fn runtime(&self, state: AppState) -> Runtime {
        let executor = CommandExecutor::new(
            Arc::clone(&self.store),
            Arc::clone(&self.remote),
            self.coordinator(),
            Arc::clone(&self.opener),
        );
        Runtime::new(state, executor)
    }
}

/// Stands in for the Octobox client until a token is saved.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredRemote;

impl UnconfiguredRemote {
    fn missing<T>() -> Result<T> {
        Err(TriageError::Auth(
            "no API token configured; run `octotriage token <TOKEN>` or set OCTOBOX_API_TOKEN"
                .to_string(),
        ))
    }
}

#[async_trait]
impl RemoteService for UnconfiguredRemote {
    async fn fetch_page(&self, _page: u32, _filters: &FetchFilters) -> Result<NotificationPage> {
        Self::missing()
    }

    async fn trigger_sync(&self) -> Result<()> {
        Self::missing()
    }

    async fn is_syncing(&self) -> Result<bool> {
        Self::missing()
    }

    async fn star(&self, _id: NotificationId) -> Result<()> {
        Self::missing()
    }

    async fn archive(&self, _ids: &[NotificationId]) -> Result<()> {
        Self::missing()
    }

    async fn unarchive(&self, _ids: &[NotificationId]) -> Result<()> {
        Self::missing()
    }

    async fn mute(&self, _ids: &[NotificationId]) -> Result<()> {
        Self::missing()
    }

    async fn mark_read(&self, _ids: &[NotificationId]) -> Result<()> {
        Self::missing()
    }

    async fn pinned_searches(&self) -> Result<Vec<PinnedSearch>> {
        Self::missing()
    }

    async fn user_profile(&self) -> Result<UserProfile> {
        Self::missing()
    }

    async fn unread_count(&self) -> Result<u64> {
        Self::missing()
    }
}
