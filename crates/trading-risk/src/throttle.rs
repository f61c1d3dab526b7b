//! Daily trade cap and post-trade cooldown.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Throttle limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThrottleLimits {
    /// Maximum entries per trading day
    pub max_trades_per_day: u32,
    /// Entry-timeframe bars to wait after an entry
    pub cooldown_bars: u32,
}

impl Default for ThrottleLimits {
    fn default() -> Self {
        Self {
            max_trades_per_day: 10,
            cooldown_bars: 10,
        }
    }
}

/// Throttle counters for the current trading day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleState {
    pub trades_opened_today: u32,
    pub cooldown_bars_remaining: u32,
    pub current_trading_day: Option<NaiveDate>,
}

/// Gates new entries by daily count and cooldown.
///
/// Only [`TradeThrottle::on_new_bar`] moves the cooldown, so redundant polls of
/// the same bar leave the counters untouched as long as the caller dedupes by
/// bar timestamp.
#[derive(Debug, Clone)]
pub struct TradeThrottle {
    limits: ThrottleLimits,
    state: ThrottleState,
}

impl TradeThrottle {
    pub fn new(limits: ThrottleLimits) -> Self {
        Self {
            limits,
            state: ThrottleState::default(),
        }
    }

    pub fn limits(&self) -> &ThrottleLimits {
        &self.limits
    }

    pub fn state(&self) -> &ThrottleState {
        &self.state
    }

    /// Advance to a new entry-timeframe bar whose local date is `day`.
    ///
    /// A later day resets both counters first; the cooldown then ticks down once.
    /// An earlier day leaves the counters untouched.
    pub fn on_new_bar(&mut self, day: NaiveDate) {
        if let Some(current) = self.state.current_trading_day {
            if day < current {
                debug!(%day, %current, "Bar from an earlier day ignored");
                return;
            }
        }

        if self.state.current_trading_day != Some(day) {
            if self.state.current_trading_day.is_some() {
                info!(
                    %day,
                    trades = self.state.trades_opened_today,
                    "New trading day, throttle reset"
                );
            }
            self.state = ThrottleState {
                trades_opened_today: 0,
                cooldown_bars_remaining: 0,
                current_trading_day: Some(day),
            };
        }

        if self.state.cooldown_bars_remaining > 0 {
            self.state.cooldown_bars_remaining -= 1;
            debug!(
                remaining = self.state.cooldown_bars_remaining,
                "Cooldown decremented"
            );
        }
    }

    /// Record a successfully submitted entry.
    pub fn record_trade(&mut self) {
        self.state.trades_opened_today += 1;
        self.state.cooldown_bars_remaining = self.limits.cooldown_bars;
    }

    /// Throttle half of the entry gate; the caller also checks for an open position.
    pub fn allows_entry(&self) -> bool {
        self.state.cooldown_bars_remaining == 0
            && self.state.trades_opened_today < self.limits.max_trades_per_day
    }
}
