//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "btc-trader")]
#[command(author, version, about = "Always-on BTC/USD trend-following trading controller")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "TRADING_CONFIG", default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (defaults to logging.level from the config file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trade through the Alpaca account (paper or live per `alpaca.paper`)
    Live,
    /// Trade against a local simulated account using Alpaca market data
    Paper(PaperArgs),
    /// Print the account and position snapshot, then exit
    Status,
    /// Validate configuration and credentials
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct PaperArgs {
    /// Starting cash (defaults to engine.paper_initial_cash)
    #[arg(long)]
    pub capital: Option<Decimal>,
}
