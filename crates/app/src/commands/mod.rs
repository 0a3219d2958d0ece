//! One handler per CLI subcommand.
//!
//! Handlers that touch notifications drive the same reducer events as the
//! interactive loop and wait for background completions before returning, so
//! a failed remote mutation has been rolled back by the time they report.

pub mod account;
pub mod actions;
pub mod sync;
pub mod views;

use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use octotriage_core::{AppState, Runtime};
use octotriage_domain::ViewFilter;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

pub use actions::Action;

use crate::cli::CliCommand;
use crate::context::AppContext;
use crate::shell::run_shell;
use crate::utils::logging::{log_command_error, log_command_ok, log_command_start};

/// Run `command`, logging its start and outcome.
pub async fn run<W: Write>(
    ctx: &AppContext,
    command: CliCommand,
    out: &mut W,
    cancel: CancellationToken,
) -> Result<()> {
    let command_name = command.name();
    let start = Instant::now();
    log_command_start(command_name);

    // The shell handles interrupts itself so it can settle in-flight work.
    let result = if command == CliCommand::Shell {
        dispatch(ctx, command, out, cancel).await
    } else {
        tokio::select! {
            result = dispatch(ctx, command, out, cancel.clone()) => result,
            () = cancel.cancelled() => Err(anyhow::anyhow!("interrupted")),
        }
    };

    match &result {
        Ok(()) => log_command_ok(command_name, start.elapsed()),
        Err(err) => log_command_error(command_name, start.elapsed(), err),
    }
    result
}

async fn dispatch<W: Write>(
    ctx: &AppContext,
    command: CliCommand,
    out: &mut W,
    cancel: CancellationToken,
) -> Result<()> {
    match command {
        CliCommand::List { view, query } => views::list(ctx, view, &query, out).await,
        CliCommand::Sync { github } => sync::sync(ctx, github, out).await,
        CliCommand::Star { id } => actions::apply(ctx, Action::Star, &[id], out).await,
        CliCommand::Archive { ids } => actions::apply(ctx, Action::Archive, &ids, out).await,
        CliCommand::Unarchive { ids } => actions::apply(ctx, Action::Unarchive, &ids, out).await,
        CliCommand::Mute { id } => actions::apply(ctx, Action::Mute, &[id], out).await,
        CliCommand::Read { ids } => actions::apply(ctx, Action::Read, &ids, out).await,
        CliCommand::Open { id } => actions::apply(ctx, Action::Open, &[id], out).await,
        CliCommand::Facets => views::facets(ctx, out).await,
        CliCommand::Pinned { name } => views::pinned(ctx, name.as_deref(), out).await,
        CliCommand::Whoami => account::whoami(ctx, out).await,
        CliCommand::Token { token } => account::token(ctx, &token, out),
        CliCommand::Shell => {
            let input = BufReader::new(tokio::io::stdin());
            run_shell(ctx, input, out, cancel).await.map_err(Into::into)
        }
    }
}

/// Turn the error a runtime left in its state into a command failure.
fn reported(runtime: &Runtime) -> Result<()> {
    match &runtime.state().error {
        Some(message) => Err(anyhow::anyhow!(message.clone())),
        None => Ok(()),
    }
}

/// Fresh state showing `view`.
fn state_for(ctx: &AppContext, view: ViewFilter) -> AppState {
    let mut state = ctx.initial_state();
    state.view = view;
    state
}
