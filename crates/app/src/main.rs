//! octotriage - terminal triage for Octobox notifications
//!
//! Main entry point for the command-line application.

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use octotriage_app::{commands, AppContext, Cli};
use octotriage_infra::{config, init_logging};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before the configuration reads the environment
    let dotenv = dotenvy::dotenv();

    let config = config::load().context("loading configuration")?;
    let _log_guard = init_logging(&config.logging, &config.log_directory())
        .context("initialising logging")?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(error = %err, "could not load .env"),
    }

    let ctx = AppContext::new(config).context("opening the notification cache")?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            on_interrupt.cancel();
        }
    });

    let mut stdout = io::stdout();
    commands::run(&ctx, cli.into_command(), &mut stdout, cancel).await
}
