//! Background tasks that report back through a completion queue.
//!
//! Each task posts exactly one [`TaskOutcome`] when it finishes (plus any
//! progress messages it sends through a [`TaskSender`]). The foreground loop
//! drains the queue once per frame, so rollbacks and error reporting happen
//! on the foreground side in a deterministic order.

use std::future::Future;

use octotriage_domain::Result;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, Instrument};

use super::actions::ActionPlan;
use super::resync::{ResyncOutcome, SyncPhase};

/// Completion (or progress) message from a background task.
#[derive(Debug, Clone)]
pub enum TaskOutcome {
    /// Remote half of an optimistic action finished.
    Action { plan: ActionPlan, result: Result<()> },
    /// Full resync finished.
    Resync(Result<ResyncOutcome>),
    /// Full resync entered a new phase.
    Phase(SyncPhase),
}

/// Cloneable handle for posting messages onto the queue.
#[derive(Debug, Clone)]
pub struct TaskSender {
    tx: UnboundedSender<TaskOutcome>,
}

impl TaskSender {
    pub fn post(&self, outcome: TaskOutcome) {
        if self.tx.send(outcome).is_err() {
            debug!("task queue closed; dropping completion");
        }
    }
}

/// Spawner plus completion queue.
#[derive(Debug)]
pub struct TaskQueue {
    tx: UnboundedSender<TaskOutcome>,
    rx: UnboundedReceiver<TaskOutcome>,
    tasks: JoinSet<()>,
}

impl TaskQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, tasks: JoinSet::new() }
    }

    pub fn sender(&self) -> TaskSender {
        TaskSender { tx: self.tx.clone() }
    }

    /// Run `task` on the tokio runtime and post its outcome when it finishes.
    pub fn spawn<F>(&mut self, name: &'static str, task: F)
    where
        F: Future<Output = TaskOutcome> + Send + 'static,
    {
        let sender = self.sender();
        debug!(task = name, "spawning background task");
        self.tasks.spawn(
            async move {
                let outcome = task.await;
                sender.post(outcome);
            }
            .instrument(tracing::info_span!("background_task", task = name)),
        );
    }

    /// Tasks spawned and not yet reaped.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Take every message posted so far without waiting.
    pub fn drain(&mut self) -> Vec<TaskOutcome> {
        while let Some(joined) = self.tasks.try_join_next() {
            log_join(joined);
        }
        let mut outcomes = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Wait for the next message. `None` once nothing is queued and no task
    /// is left running.
    pub async fn next(&mut self) -> Option<TaskOutcome> {
        loop {
            if let Ok(outcome) = self.rx.try_recv() {
                return Some(outcome);
            }
            if self.tasks.is_empty() {
                return None;
            }
            tokio::select! {
                outcome = self.rx.recv() => return outcome,
                Some(joined) = self.tasks.join_next() => log_join(joined),
            }
        }
    }

    /// Wait for every running task, then drain the queue.
    pub async fn settle(&mut self) -> Vec<TaskOutcome> {
        while let Some(joined) = self.tasks.join_next().await {
            log_join(joined);
        }
        self.drain()
    }
}

impl Default for TaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn log_join(joined: std::result::Result<(), JoinError>) {
    if let Err(err) = joined {
        error!(error = %err, "background task did not complete");
    }
}
