//! Per-bar status block.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use tracing::info;
use trading_core::types::AccountSnapshot;

use crate::events::price;

const RULE_WIDTH: usize = 90;

/// Everything shown once per new entry bar.
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub now: DateTime<Utc>,
    pub timezone: Tz,
    pub bar_time: DateTime<Utc>,
    pub bar_close: f64,
    /// Base asset shown next to the position size, e.g. `BTC`
    pub asset: String,
    pub account: AccountSnapshot,
    pub htf_bullish: bool,
    pub trend_up: bool,
    pub can_enter: bool,
    pub trades_today: u32,
    pub max_trades_per_day: u32,
}

impl StatusReport {
    pub fn log(&self) {
        info!("\n{}", self);
    }
}

fn as_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// Whole-dollar figure with thousands separators.
fn dollars(value: Decimal) -> String {
    let text = price(as_f64(value.round_dp(0)));
    text.trim_end_matches(".00").to_string()
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "\u{2550}".repeat(RULE_WIDTH);
        let now = self.now.with_timezone(&self.timezone);
        let bar = self.bar_time.with_timezone(&self.timezone);
        let acc = &self.account;

        writeln!(f, "{}", rule)?;
        writeln!(f, " TIME          : {}", now.format("%Y-%m-%d %H:%M:%S %Z"))?;
        writeln!(
            f,
            " BAR           : {} | Close {}",
            bar.format("%H:%M"),
            price(self.bar_close)
        )?;
        writeln!(
            f,
            " ACCOUNT       : Equity ${} | BP ${} | Crypto {}",
            dollars(acc.equity),
            dollars(acc.buying_power),
            acc.crypto_status
        )?;
        writeln!(
            f,
            " POSITION      : {} {:.4} {} @ ${} | P&L ${:+.2}",
            acc.position_side,
            as_f64(acc.quantity),
            self.asset,
            price(as_f64(acc.entry_price)),
            as_f64(acc.unrealized_pnl)
        )?;
        writeln!(
            f,
            " BIAS          : HTF {} | Trend {}",
            if self.htf_bullish { "Bullish" } else { "Bearish" },
            if self.trend_up { "Up" } else { "Down" }
        )?;
        writeln!(
            f,
            " CAN ENTER     : {} | Trades Today: {}/{}",
            if self.can_enter { "YES" } else { "NO" },
            self.trades_today,
            self.max_trades_per_day
        )?;
        write!(f, "{}", rule)
    }
}
