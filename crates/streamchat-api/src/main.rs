//! streamchat CLI entry point.
//!
//! Binary name: `streamchat`
//!
//! Parses CLI arguments, sets up tracing, opens the local store and then
//! dispatches to the interactive chat or one of the history commands.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;
use streamchat_observe::tracing_setup::{init_tracing, shutdown_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_filter(), cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "streamchat", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.model.clone()).await?;

    match cli.subcommand() {
        Commands::Chat => cli::chat::loop_runner::run_chat_loop(&state).await?,
        Commands::History { json } => cli::history::show_history(&state, json).await?,
        Commands::Clear => cli::history::clear_history(&state).await?,
        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
