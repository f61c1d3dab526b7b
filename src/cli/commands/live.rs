//! Trade through the Alpaca account.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};
use trading_config::AppConfig;

use super::{alpaca_broker, market_data, notification_hub, prepare, run_controller};

pub async fn run(settings: AppConfig) -> Result<()> {
    let creds = prepare(&settings)?;

    if settings.alpaca.paper {
        info!(symbol = %settings.strategy.symbol, "Starting on the Alpaca paper account");
    } else {
        warn!(symbol = %settings.strategy.symbol, "Starting on a LIVE Alpaca account");
    }

    let broker = Arc::new(alpaca_broker(&settings, &creds)?);
    let data = Arc::new(market_data(&settings, &creds)?);
    let hub = notification_hub(&settings, &creds)?;

    run_controller(&settings, broker, data, hub).await
}
