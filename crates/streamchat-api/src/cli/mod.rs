//! CLI command definitions and dispatch for the `streamchat` binary.
//!
//! Uses clap derive macros for argument parsing. With no subcommand the
//! interactive chat starts.

pub mod chat;
pub mod history;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat with Gemini from your terminal.
#[derive(Parser)]
#[command(name = "streamchat", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for info, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Override the model from config.toml.
    #[arg(long, global = true, env = "STREAMCHAT_MODEL")]
    pub model: Option<String>,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start an interactive chat (the default).
    Chat,

    /// Print the stored conversation.
    History {
        /// Output machine-readable JSON instead of styled text.
        #[arg(long)]
        json: bool,
    },

    /// Delete the stored conversation.
    Clear,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// The subcommand to run, defaulting to `chat`.
    pub fn subcommand(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Chat)
    }

    /// Log filter directives for the verbosity flags.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_command_is_chat() {
        let cli = Cli::try_parse_from(["streamchat"]).unwrap();
        assert_eq!(cli.subcommand(), Commands::Chat);
    }

    #[test]
    fn test_history_json_flag() {
        let cli = Cli::try_parse_from(["streamchat", "history", "--json"]).unwrap();
        assert_eq!(cli.subcommand(), Commands::History { json: true });
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["streamchat", "chat", "-vv", "--model", "gemini-2.5-pro"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(cli.log_filter(), "debug");
    }

    #[test]
    fn test_log_filter() {
        let quiet = Cli::try_parse_from(["streamchat", "--quiet"]).unwrap();
        assert_eq!(quiet.log_filter(), "error");

        let default = Cli::try_parse_from(["streamchat"]).unwrap();
        assert_eq!(default.log_filter(), "warn");
    }
}
