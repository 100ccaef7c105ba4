//! Composio CLI main entry point

use clap::Parser;
use composio_cli::{
    cli::{Cli, Commands},
    commands::{AccountsCmd, ActionsCmd, ExecuteCommand, ToolsCommand},
    error::CliResult,
    utils::{build_client, init_tracing, ColoredOutput},
};
use tracing::debug;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    debug!("Composio CLI v{}", env!("CARGO_PKG_VERSION"));

    let client = build_client(&cli)?;

    match cli.command {
        Commands::Execute { args } => ExecuteCommand::run(&client, args).await,
        Commands::Accounts { command } => AccountsCmd::run(&client, command).await,
        Commands::Actions { command } => ActionsCmd::run(&client, command).await,
        Commands::Tools { actions } => ToolsCommand::run(client, &actions).await,
    }
}
