//! Runs reducer commands against the store, the remote service and the
//! background task queue.

use std::sync::Arc;

use octotriage_domain::{NotificationId, NotificationPatch, Result, ViewFilter};
use tracing::{debug, error, info, instrument, warn};

use super::event::{Command, Event, ViewSnapshot};
use crate::sync::ports::{NotificationStore, RemoteService, UrlOpener};
use crate::sync::{ActionPlan, ResyncCoordinator, ResyncOptions, TaskOutcome, TaskQueue};

pub struct CommandExecutor {
    store: Arc<dyn NotificationStore>,
    remote: Arc<dyn RemoteService>,
    coordinator: ResyncCoordinator,
    opener: Arc<dyn UrlOpener>,
    tasks: TaskQueue,
}

impl CommandExecutor {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        remote: Arc<dyn RemoteService>,
        coordinator: ResyncCoordinator,
        opener: Arc<dyn UrlOpener>,
    ) -> Self {
        Self { store, remote, coordinator, opener, tasks: TaskQueue::new() }
    }

    /// Run one command. Synchronous store work finishes before this returns;
    /// remote mutations and resyncs are spawned and report through the queue.
    pub async fn execute(&mut self, command: Command) -> Vec<Event> {
        match command {
            Command::LoadView(view) => match self.load(view).await {
                Ok(snapshot) => vec![Event::Loaded(snapshot)],
                Err(err) => {
                    error!(?view, error = %err, "view load failed");
                    vec![Event::LoadFailed(err.user_message())]
                }
            },
            Command::CheckStale => match self.coordinator.is_stale().await {
                Ok(stale) => {
                    info!(stale, "cache staleness checked");
                    vec![Event::StaleChecked(stale)]
                }
                Err(err) => {
                    warn!(error = %err, "staleness check failed; treating cache as stale");
                    vec![Event::StaleChecked(true)]
                }
            },
            Command::ProbeCounts => match self.store.counts().await {
                Ok(counts) => vec![Event::CountsProbed(counts)],
                Err(err) => {
                    debug!(error = %err, "count probe failed");
                    Vec::new()
                }
            },
            Command::Apply(plan) => self.apply(plan).await,
            Command::Rollback { action, patches } => {
                warn!(action, records = patches.len(), "action.rollback");
                match self.patch_all(&patches).await {
                    Ok(()) => Vec::new(),
                    Err(err) => vec![local_error("rollback", &err)],
                }
            }
            Command::Resync(options) => {
                self.spawn_resync(options);
                Vec::new()
            }
            Command::OpenUrl(url) => match self.opener.open(&url) {
                Ok(()) => Vec::new(),
                Err(err) => vec![local_error("open", &err)],
            },
        }
    }

    /// Completions posted since the last call.
    pub fn drain(&mut self) -> Vec<TaskOutcome> {
        self.tasks.drain()
    }

    /// Wait for the next completion. `None` once every task has reported.
    pub async fn next_outcome(&mut self) -> Option<TaskOutcome> {
        self.tasks.next().await
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.in_flight()
    }

    #[instrument(skip(self))]
    async fn load(&self, view: ViewFilter) -> Result<ViewSnapshot> {
        let notifications = self.store.load_view(view).await?;
        let counts = self.store.counts().await?;
        let facets = self.store.facets().await?;
        debug!(rows = notifications.len(), "view loaded");
        Ok(ViewSnapshot { view, notifications, counts, facets })
    }

    async fn patch_all(&self, patches: &[(NotificationId, NotificationPatch)]) -> Result<()> {
        for (id, patch) in patches {
            if !self.store.patch(*id, *patch).await? {
                debug!(notification_id = id, "patch skipped unknown notification");
            }
        }
        Ok(())
    }

    /// Patch each row in order. On a failed write the rows already patched
    /// are restored and the remote mutation is never sent.
    async fn apply(&mut self, plan: ActionPlan) -> Vec<Event> {
        let action = plan.remote.name();
        for (done, (id, patch)) in plan.patches.iter().enumerate() {
            match self.store.patch(*id, *patch).await {
                Ok(true) => {}
                Ok(false) => debug!(notification_id = id, "patch skipped unknown notification"),
                Err(err) => {
                    warn!(action, records = done, "action.rollback");
                    let mut events = Vec::new();
                    if let Err(undo) = self.patch_all(&plan.rollback[..done]).await {
                        events.push(local_error("rollback", &undo));
                    }
                    error!(action, notification_id = id, error = %err, "local patch failed");
                    events.push(Event::LocalError(format!(
                        "{action} failed: {}",
                        err.user_message()
                    )));
                    return events;
                }
            }
        }
        self.spawn_remote(plan);
        Vec::new()
    }

    fn spawn_remote(&mut self, plan: ActionPlan) {
        let remote = Arc::clone(&self.remote);
        let action = plan.remote.name();
        self.tasks.spawn(action, async move {
            let result = plan.remote.execute(remote.as_ref()).await;
            match &result {
                Ok(()) => info!(action, ids = ?plan.remote.ids(), "action confirmed"),
                Err(err) => error!(action, error = %err, "action failed remotely"),
            }
            TaskOutcome::Action { plan, result }
        });
    }

    fn spawn_resync(&mut self, options: ResyncOptions) {
        let coordinator = self.coordinator.clone();
        let progress = self.tasks.sender();
        self.tasks.spawn("resync", async move {
            let result = coordinator
                .run(options, move |phase| {
                    debug!(?phase, "sync.phase");
                    progress.post(TaskOutcome::Phase(phase));
                })
                .await;
            TaskOutcome::Resync(result)
        });
    }
}

fn local_error(operation: &str, err: &octotriage_domain::TriageError) -> Event {
    error!(operation, error = %err, "command failed");
    Event::LocalError(err.user_message())
}
