//! Tracks the single open position until a stop or target exit.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};
use trading_core::types::Direction;

use crate::stop_loss::is_triggered;

/// Why a position should be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopLoss => write!(f, "STOP LOSS"),
            ExitReason::TakeProfit => write!(f, "TAKE PROFIT"),
        }
    }
}

/// An open position held by the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub direction: Direction,
    pub entry_price: f64,
    /// |signal close - stop loss|, fixed for the life of the position
    pub risk_distance: f64,
}

impl OpenPosition {
    pub fn new(direction: Direction, entry_price: f64, risk_distance: f64) -> Self {
        Self {
            direction,
            entry_price,
            risk_distance: risk_distance.abs(),
        }
    }

    /// Stop price relative to the current entry price.
    pub fn stop_price(&self) -> f64 {
        match self.direction {
            Direction::Long => self.entry_price - self.risk_distance,
            Direction::Short => self.entry_price + self.risk_distance,
        }
    }

    /// Target price relative to the current entry price.
    pub fn target_price(&self, risk_reward: f64) -> f64 {
        let reward = self.risk_distance * risk_reward;
        match self.direction {
            Direction::Long => self.entry_price + reward,
            Direction::Short => self.entry_price - reward,
        }
    }

    /// Compare an exit-side price against the stop and target thresholds.
    ///
    /// The stop is checked first so a zero risk distance never reports a profit.
    pub fn check_exit(&self, exit_price: f64, risk_reward: f64) -> Option<ExitReason> {
        if is_triggered(self.direction, self.stop_price(), exit_price) {
            return Some(ExitReason::StopLoss);
        }

        let target = self.target_price(risk_reward);
        let target_hit = match self.direction {
            Direction::Long => exit_price >= target,
            Direction::Short => exit_price <= target,
        };
        target_hit.then_some(ExitReason::TakeProfit)
    }
}

/// Flat / Open state machine for the single tradable position.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    risk_reward: f64,
    position: Option<OpenPosition>,
}

impl PositionTracker {
    pub fn new(risk_reward: f64) -> Self {
        Self {
            risk_reward,
            position: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    /// Start tracking after an accepted entry order.
    pub fn open(&mut self, direction: Direction, entry_price: f64, risk_distance: f64) -> OpenPosition {
        let position = OpenPosition::new(direction, entry_price, risk_distance);
        info!(
            %direction,
            entry = entry_price,
            risk = position.risk_distance,
            "Tracking open position"
        );
        self.position = Some(position);
        position
    }

    /// Replace the entry price with the broker's average entry price.
    ///
    /// The risk distance is kept, so stop and target move with the entry.
    pub fn refresh_entry(&mut self, entry_price: f64) {
        if let Some(position) = self.position.as_mut() {
            if entry_price.is_finite() && entry_price > 0.0 && entry_price != position.entry_price {
                debug!(
                    old = position.entry_price,
                    new = entry_price,
                    "Entry price refreshed from broker"
                );
                position.entry_price = entry_price;
            }
        }
    }

    /// Exit decision for the current exit-side quote; `None` while flat.
    pub fn check_exit(&self, exit_price: f64) -> Option<ExitReason> {
        self.position
            .as_ref()
            .and_then(|p| p.check_exit(exit_price, self.risk_reward))
    }

    /// Drop the tracked position, returning it if there was one.
    pub fn mark_flat(&mut self) -> Option<OpenPosition> {
        self.position.take()
    }
}
