//! Command-line surface.

use clap::{Parser, Subcommand};
use octotriage_domain::{NotificationId, ViewFilter};

#[derive(Debug, Parser)]
#[command(name = "octotriage", version, about = "Triage Octobox notifications from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl Cli {
    /// The subcommand to run; a bare `octotriage` opens the shell.
    pub fn into_command(self) -> CliCommand {
        self.command.unwrap_or(CliCommand::Shell)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum CliCommand {
    /// List cached notifications, refreshing first when the cache is stale.
    List {
        #[arg(long, default_value_t = ViewFilter::Inbox, value_parser = parse_view)]
        view: ViewFilter,
        /// Search query, e.g. `repo:octo/app is:unread`.
        #[arg(trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// Refresh the local cache from Octobox.
    Sync {
        /// Ask Octobox to sync with GitHub first and wait for it.
        #[arg(long)]
        github: bool,
    },
    /// Toggle the star on a notification.
    Star { id: NotificationId },
    Archive {
        #[arg(required = true)]
        ids: Vec<NotificationId>,
    },
    Unarchive {
        #[arg(required = true)]
        ids: Vec<NotificationId>,
    },
    Mute { id: NotificationId },
    /// Mark notifications as read.
    Read {
        #[arg(required = true)]
        ids: Vec<NotificationId>,
    },
    /// Open a notification in the browser and mark it read.
    Open { id: NotificationId },
    /// Show the sidebar facets of the inbox.
    Facets,
    /// List pinned searches, or the inbox rows matching one.
    Pinned { name: Option<String> },
    /// Show the Octobox account the token belongs to.
    Whoami,
    /// Save the API token to the data directory.
    Token { token: String },
    /// Interactive triage loop reading one intent per line.
    Shell,
}

impl CliCommand {
    /// Stable name used in logs.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::Sync { .. } => "sync",
            Self::Star { .. } => "star",
            Self::Archive { .. } => "archive",
            Self::Unarchive { .. } => "unarchive",
            Self::Mute { .. } => "mute",
            Self::Read { .. } => "read",
            Self::Open { .. } => "open",
            Self::Facets => "facets",
            Self::Pinned { .. } => "pinned",
            Self::Whoami => "whoami",
            Self::Token { .. } => "token",
            Self::Shell => "shell",
        }
    }
}

fn parse_view(value: &str) -> Result<ViewFilter, String> {
    value.parse().map_err(|err: octotriage_domain::TriageError| err.user_message())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_takes_a_view_and_a_free_query() {
        let args = ["octotriage", "list", "--view", "starred", "repo:octo/app", "is:unread"];
        let cli = Cli::try_parse_from(args).expect("parse");
        assert_eq!(
            cli.into_command(),
            CliCommand::List {
                view: ViewFilter::Starred,
                query: vec!["repo:octo/app".into(), "is:unread".into()],
            }
        );
    }

    #[test]
    fn bulk_commands_need_ids() {
        assert!(Cli::try_parse_from(["octotriage", "archive"]).is_err());
        let cli = Cli::try_parse_from(["octotriage", "read", "1", "2"]).expect("parse");
        assert_eq!(cli.into_command(), CliCommand::Read { ids: vec![1, 2] });
    }

    #[test]
    fn unknown_view_is_rejected() {
        assert!(Cli::try_parse_from(["octotriage", "list", "--view", "spam"]).is_err());
    }

    #[test]
    fn no_subcommand_opens_the_shell() {
        let cli = Cli::try_parse_from(["octotriage"]).expect("parse");
        assert_eq!(cli.into_command(), CliCommand::Shell);
    }
}
