//! Vigil CLI entry point.

use clap::Parser;

use vigil::cli::commands;
use vigil::cli::{handle_error, init_logging, load_config, Cli, Commands};
use vigil::domain::models::LoggingConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json_mode);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Init(args) => {
            let _logger = init_logging(&LoggingConfig::default())?;
            commands::init::execute(args, cli.json).await
        }
        Commands::Analyze(args) => {
            let config = load_config(cli.config.as_deref())?;
            let _logger = init_logging(&config.logging)?;
            commands::analyze::execute(args, &config, cli.json).await
        }
        Commands::Config => {
            let config = load_config(cli.config.as_deref())?;
            let _logger = init_logging(&config.logging)?;
            commands::config::execute(&config, cli.json)
        }
    }
}
