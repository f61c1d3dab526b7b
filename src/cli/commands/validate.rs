//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use trading_config::{AppConfig, Credentials};

pub fn run(config_path: &Path, config: AppConfig) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    let strategy = &config.strategy;
    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Alpaca paper mode: {}", config.alpaca.paper);
    println!(
        "Instrument: {} x {} ({} entries, {} bias)",
        strategy.symbol, strategy.lot_size, strategy.entry_timeframe, strategy.higher_timeframe
    );
    println!(
        "Risk:reward {} | max {} trades/day | cooldown {} bars",
        strategy.risk_reward, strategy.max_trades_per_day, strategy.cooldown_bars
    );
    println!(
        "EMA {}/{} | ATR {} x {} | timezone {}",
        strategy.ema_fast, strategy.ema_slow, strategy.atr_period, strategy.atr_stop_buffer, strategy.timezone
    );

    match Credentials::from_env(&config) {
        Ok(creds) => println!("Credentials: ok ({:?})", creds),
        Err(e) => {
            println!("Credentials: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
