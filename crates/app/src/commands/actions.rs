//! Per-notification actions, applied optimistically through the reducer.

use std::io::Write;

use anyhow::{Context, Result};
use octotriage_common::time::Clock;
use octotriage_core::{Event, Runtime};
use octotriage_domain::{Notification, NotificationId, TriageError, ViewFilter};
use tracing::{debug, info};

use super::{reported, state_for};
use crate::context::AppContext;
use crate::utils::render::format_row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Toggles, like the `s` key.
    Star,
    Archive,
    Unarchive,
    Mute,
    Read,
    Open,
}

impl Action {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
            Self::Mute => "mute",
            Self::Read => "read",
            Self::Open => "open",
        }
    }

    /// The event to dispatch for `target`, or `None` when it is already in
    /// the state the action would put it in.
    pub fn event_for(self, target: &Notification) -> Option<Event> {
        match self {
            Self::Star => Some(Event::ToggleStar),
            Self::Archive => (!target.archived).then_some(Event::ToggleArchive),
            Self::Unarchive => target.archived.then_some(Event::ToggleArchive),
            Self::Mute => (!target.muted).then_some(Event::Mute),
            Self::Read => target.unread.then_some(Event::MarkRead),
            Self::Open => Some(Event::Open),
        }
    }
}

fn cached(runtime: &Runtime, id: NotificationId) -> Result<Notification> {
    runtime
        .state()
        .notifications
        .iter()
        .find(|n| n.id == id)
        .cloned()
        .ok_or_else(|| TriageError::NotFound(format!("notification {id} is not cached")).into())
}

/// Apply `action` to each id, wait for the remote confirmations and print
/// the resulting rows. A rejected action has been rolled back locally when
/// this returns its error.
pub async fn apply<W: Write>(
    ctx: &AppContext,
    action: Action,
    ids: &[NotificationId],
    out: &mut W,
) -> Result<()> {
    let mut runtime = ctx.runtime(state_for(ctx, ViewFilter::All));
    runtime.dispatch(Event::SetView(ViewFilter::All)).await;
    reported(&runtime)?;

    let mut failure = None;
    for &id in ids {
        let target = match cached(&runtime, id) {
            Ok(target) => target,
            Err(err) => {
                failure = Some(err);
                break;
            }
        };
        if action == Action::Open && target.web_url.is_none() {
            let message = format!("notification {id} has no web url");
            failure = Some(TriageError::InvalidInput(message).into());
            break;
        }
        let Some(event) = action.event_for(&target) else {
            debug!(notification_id = id, action = action.name(), "already applied");
            continue;
        };
        runtime.dispatch(Event::SelectId(id)).await;
        runtime.dispatch(event).await;
        info!(notification_id = id, action = action.name(), "action dispatched");
    }

    // Earlier ids may have remote confirmations in flight even on failure.
    runtime.settle().await;

    let now = ctx.clock.utc_now();
    for &id in ids {
        if let Some(row) = ctx.store.get(id).await? {
            writeln!(out, "{}", format_row(&row, now, false)).context("writing the result")?;
        }
    }
    match failure {
        Some(err) => Err(err),
        None => reported(&runtime),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn idempotent_actions_skip_records_already_there() {
        let mut row = Notification::new(1, Utc::now());
        row.archived = true;
        row.unread = false;

        assert!(Action::Archive.event_for(&row).is_none());
        assert!(matches!(Action::Unarchive.event_for(&row), Some(Event::ToggleArchive)));
        assert!(Action::Read.event_for(&row).is_none());
        assert!(matches!(Action::Star.event_for(&row), Some(Event::ToggleStar)));
        assert!(matches!(Action::Mute.event_for(&row), Some(Event::Mute)));
    }
}
