//! Frame-driven foreground loop glue.

use std::collections::VecDeque;
use std::sync::Arc;

use octotriage_common::time::{Clock, SystemClock};

use super::event::Event;
use super::executor::CommandExecutor;
use super::reducer::reduce;
use super::state::AppState;

/// Owns the state and feeds events through the reducer, executing the
/// resulting commands until no follow-up events remain.
pub struct Runtime {
    state: AppState,
    executor: CommandExecutor,
    clock: Arc<dyn Clock>,
}

impl Runtime {
    pub fn new(state: AppState, executor: CommandExecutor) -> Self {
        Self { state, executor, clock: Arc::new(SystemClock) }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub const fn state(&self) -> &AppState {
        &self.state
    }

    pub fn in_flight(&self) -> usize {
        self.executor.in_flight()
    }

    /// Reduce `event` and everything its commands produce.
    pub async fn dispatch(&mut self, event: Event) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            let (next, commands) = reduce(std::mem::take(&mut self.state), event);
            self.state = next;
            for command in commands {
                pending.extend(self.executor.execute(command).await);
            }
        }
    }

    /// One foreground frame: fold in background completions, then run the
    /// idle probe.
    pub async fn frame(&mut self) {
        for outcome in self.executor.drain() {
            self.dispatch(Event::TaskCompleted(outcome)).await;
        }
        let at = self.clock.now();
        self.dispatch(Event::Idle { at }).await;
    }

    /// Wait until every background task has reported and been reduced,
    /// including tasks spawned while settling.
    pub async fn settle(&mut self) {
        while let Some(outcome) = self.executor.next_outcome().await {
            self.dispatch(Event::TaskCompleted(outcome)).await;
        }
    }
}
