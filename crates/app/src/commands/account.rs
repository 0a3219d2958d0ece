use std::io::Write;

use anyhow::{Context, Result};
use octotriage_infra::config;

use crate::context::AppContext;

pub async fn whoami<W: Write>(ctx: &AppContext, out: &mut W) -> Result<()> {
    let profile = ctx.remote.user_profile().await?;
    let unread = ctx.remote.unread_count().await?;
    let login = profile.github_login.as_deref().unwrap_or("(unknown)");
    writeln!(out, "{login} on {} ({unread} unread)", ctx.config.remote.base_url)
        .context("writing the profile")
}

/// Store the API token for later runs.
pub fn token<W: Write>(ctx: &AppContext, token: &str, out: &mut W) -> Result<()> {
    let path = config::save_token(&ctx.config.data_dir, token)?;
    writeln!(out, "token saved to {}", path.display()).context("writing the confirmation")
}
