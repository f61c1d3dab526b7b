//! BTC/USD trading controller CLI.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use trading_config::{load_config, load_dotenv};
use trading_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    load_dotenv();

    let settings = load_config(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    let log_level = match cli.log_level {
        Some(level) => level.as_str().to_string(),
        None => settings.logging.level.clone(),
    };
    setup_logging(&log_level, cli.json_logs || settings.logging.is_json())?;

    match cli.command {
        Commands::Live => cli::commands::live::run(settings).await,
        Commands::Paper(args) => cli::commands::paper::run(args, settings).await,
        Commands::Status => cli::commands::status::run(settings).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config, settings),
    }
}
