//! Read-mostly commands: list, facets and pinned searches.

use std::io::Write;

use anyhow::{Context, Result};
use octotriage_common::time::Clock;
use octotriage_core::Event;
use octotriage_domain::{TriageError, ViewFilter};
use tracing::info;

use super::{reported, state_for};
use crate::context::AppContext;
use crate::utils::render::{render_facet_totals, render_list, render_pinned, render_sidebar};

/// Print `view`, refreshing first when the cache is stale. A failed refresh
/// still prints the cached rows, with the error in the header.
pub async fn list<W: Write>(
    ctx: &AppContext,
    view: ViewFilter,
    query: &[String],
    out: &mut W,
) -> Result<()> {
    let mut runtime = ctx.runtime(state_for(ctx, view));
    runtime.dispatch(Event::Startup).await;
    runtime.settle().await;

    if !query.is_empty() {
        runtime.dispatch(Event::SetQuery(query.join(" "))).await;
    }
    info!(view = %view, visible = runtime.state().visible().len(), "view listed");
    render_list(out, runtime.state(), ctx.clock.utc_now()).context("writing the list")
}

/// Print the inbox sidebar: tabs, pinned searches and facet groups.
pub async fn facets<W: Write>(ctx: &AppContext, out: &mut W) -> Result<()> {
    let mut runtime = ctx.runtime(state_for(ctx, ViewFilter::Inbox));
    runtime.dispatch(Event::SetView(ViewFilter::Inbox)).await;
    reported(&runtime)?;

    let state = runtime.state();
    render_sidebar(out, &state.sidebar_items(), None).context("writing the sidebar")?;
    render_facet_totals(out, &state.facets).context("writing facet totals")
}

/// Without a name, list the pinned searches. With one, print the inbox rows
/// matching it.
pub async fn pinned<W: Write>(ctx: &AppContext, name: Option<&str>, out: &mut W) -> Result<()> {
    let searches = ctx.remote.pinned_searches().await?;
    let Some(name) = name else {
        return render_pinned(out, &searches).context("writing pinned searches");
    };

    let mut state = state_for(ctx, ViewFilter::Inbox);
    state.pinned = searches;
    let mut runtime = ctx.runtime(state);
    runtime.dispatch(Event::SetView(ViewFilter::Inbox)).await;
    runtime.dispatch(Event::SelectPinned(name.to_string())).await;
    if let Some(message) = &runtime.state().error {
        return Err(TriageError::NotFound(message.clone()).into());
    }
    render_list(out, runtime.state(), ctx.clock.utc_now()).context("writing the list")
}
