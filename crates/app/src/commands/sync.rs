use std::io::Write;

use anyhow::{Context, Result};
use octotriage_core::Event;
use octotriage_domain::ViewFilter;

use super::{reported, state_for};
use crate::context::AppContext;

/// Refresh the cache, optionally after a server-side GitHub sync, and print
/// the resulting tab counts.
pub async fn sync<W: Write>(ctx: &AppContext, github: bool, out: &mut W) -> Result<()> {
    let mut runtime = ctx.runtime(state_for(ctx, ViewFilter::Inbox));
    let event = if github { Event::SyncWithGithub } else { Event::Refresh };
    runtime.dispatch(event).await;
    runtime.settle().await;
    reported(&runtime)?;

    let counts = runtime.state().counts;
    writeln!(
        out,
        "synced: inbox {}  starred {}  archived {}",
        counts.inbox, counts.starred, counts.archived
    )
    .context("writing the summary")
}
