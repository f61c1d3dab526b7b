//! One-shot account and position snapshot.

use anyhow::Result;
use trading_config::AppConfig;
use trading_core::traits::{Broker, MarketData};
use trading_core::types::AccountSnapshot;
use trading_monitor::price;

use super::{alpaca_broker, market_data, prepare};

pub async fn run(settings: AppConfig) -> Result<()> {
    let creds = prepare(&settings)?;
    let broker = alpaca_broker(&settings, &creds)?;
    let data = market_data(&settings, &creds)?;
    let symbol = &settings.strategy.symbol;

    let account = broker.get_account().await?;
    let position = broker.get_position(symbol).await?;
    let snapshot = AccountSnapshot::from_parts(&account, position.as_ref());

    println!("Account ({})", broker.name());
    println!("  Equity:        ${}", snapshot.equity.round_dp(2));
    println!("  Buying power:  ${}", snapshot.buying_power.round_dp(2));
    println!("  Crypto status: {}", snapshot.crypto_status);
    println!();
    println!("Position {}", symbol);
    println!("  Side:          {}", snapshot.position_side);
    if snapshot.position_side.is_open() {
        println!("  Quantity:      {}", snapshot.quantity);
        println!("  Entry:         ${}", snapshot.entry_price.round_dp(2));
        println!("  Unrealized:    ${}", snapshot.unrealized_pnl.round_dp(2));
    }

    match data.fetch_latest_quote(symbol).await {
        Ok(quote) => {
            println!();
            println!("Quote  bid {} / ask {}", price(quote.bid), price(quote.ask));
        }
        Err(e) => println!("\nQuote unavailable: {}", e),
    }

    Ok(())
}
