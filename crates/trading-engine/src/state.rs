//! Mutable trading state owned by the cycle driver.

use trading_core::types::{AccountSnapshot, PositionSide};
use trading_risk::{PositionTracker, ThrottleLimits, TradeThrottle};

/// Single-writer state threaded through every cycle.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub throttle: TradeThrottle,
    pub tracker: PositionTracker,
    /// Timestamp (ms) of the last entry bar a decision was taken on
    pub last_bar_timestamp: Option<i64>,
    pub account: AccountSnapshot,
}

impl EngineState {
    pub fn new(limits: ThrottleLimits, risk_reward: f64) -> Self {
        Self {
            throttle: TradeThrottle::new(limits),
            tracker: PositionTracker::new(risk_reward),
            last_bar_timestamp: None,
            account: AccountSnapshot::unavailable(),
        }
    }

    /// Only a bar later than the last processed one counts. A response missing
    /// the newest bar is handled like a repeated poll.
    pub fn is_new_bar(&self, timestamp: i64) -> bool {
        self.last_bar_timestamp.map_or(true, |last| timestamp > last)
    }

    /// Throttle open, nothing tracked locally, and the broker reports no
    /// position. An unreadable account also blocks entries.
    pub fn can_enter(&self) -> bool {
        self.throttle.allows_entry()
            && self.tracker.is_flat()
            && self.account.position_side == PositionSide::Flat
    }
}
