//! Trade against the in-process simulated account.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use trading_broker::PaperBroker;
use trading_config::AppConfig;
use trading_core::traits::MarketData;

use crate::cli::PaperArgs;

use super::{market_data, notification_hub, prepare, run_controller};

pub async fn run(args: PaperArgs, settings: AppConfig) -> Result<()> {
    let creds = prepare(&settings)?;
    let capital = args.capital.unwrap_or(settings.engine.paper_initial_cash);

    let data: Arc<dyn MarketData> = Arc::new(market_data(&settings, &creds)?);
    let broker = Arc::new(PaperBroker::new(capital, data.clone()));
    let hub = notification_hub(&settings, &creds)?;

    info!(%capital, symbol = %settings.strategy.symbol, "Starting simulated paper trading");
    run_controller(&settings, broker, data, hub).await
}
