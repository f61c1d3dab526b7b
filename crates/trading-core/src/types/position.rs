//! Position and account types.

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Side;

/// Direction of an open position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Order side that opens a position in this direction.
    pub fn entry_side(&self) -> Side {
        match self {
            Direction::Long => Side::Buy,
            Direction::Short => Side::Sell,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Side of the account's current position as shown in status reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
    Flat,
    /// The account or position query failed
    Unknown,
}

impl PositionSide {
    pub fn is_open(&self) -> bool {
        matches!(self, PositionSide::Long | PositionSide::Short)
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PositionSide::Long => "LONG",
            PositionSide::Short => "SHORT",
            PositionSide::Flat => "FLAT",
            PositionSide::Unknown => "ERR",
        };
        write!(f, "{}", s)
    }
}

/// A position as reported by the broker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerPosition {
    pub symbol: String,
    /// Positive for long, negative for short
    pub quantity: Decimal,
    pub avg_entry_price: Decimal,
    pub current_price: Decimal,
    pub unrealized_pnl: Decimal,
}

impl BrokerPosition {
    pub fn side(&self) -> PositionSide {
        if self.quantity > Decimal::ZERO {
            PositionSide::Long
        } else if self.quantity < Decimal::ZERO {
            PositionSide::Short
        } else {
            PositionSide::Flat
        }
    }

    /// Average entry price as f64 for comparison against quotes.
    pub fn entry_price_f64(&self) -> Option<f64> {
        self.avg_entry_price.to_f64().filter(|p| *p > 0.0)
    }
}

/// Raw account figures as reported by the broker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    pub equity: Decimal,
    pub buying_power: Decimal,
    /// Cash-only buying power, preferred for spot crypto when present
    pub non_marginable_buying_power: Option<Decimal>,
    pub crypto_status: Option<String>,
}

impl AccountInfo {
    /// Buying power usable for crypto: non-marginable when reported and non-zero,
    /// otherwise the general figure.
    pub fn effective_buying_power(&self) -> Decimal {
        match self.non_marginable_buying_power {
            Some(bp) if bp > Decimal::ZERO => bp,
            _ => self.buying_power,
        }
    }
}

/// Flat read-only view of account and position state, refreshed every new bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub equity: Decimal,
    pub buying_power: Decimal,
    pub crypto_status: String,
    pub position_side: PositionSide,
    /// Absolute position size
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub unrealized_pnl: Decimal,
}

impl AccountSnapshot {
    /// Combine account figures with the (optional) position for the traded symbol.
    pub fn from_parts(account: &AccountInfo, position: Option<&BrokerPosition>) -> Self {
        let (position_side, quantity, entry_price, unrealized_pnl) = match position {
            Some(p) => (p.side(), p.quantity.abs(), p.avg_entry_price, p.unrealized_pnl),
            None => (PositionSide::Flat, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        };

        Self {
            equity: account.equity,
            buying_power: account.effective_buying_power(),
            crypto_status: account
                .crypto_status
                .clone()
                .unwrap_or_else(|| "UNKNOWN".to_string()),
            position_side,
            quantity,
            entry_price,
            unrealized_pnl,
        }
    }

    /// Placeholder used when the account query fails.
    pub fn unavailable() -> Self {
        Self {
            equity: Decimal::ZERO,
            buying_power: Decimal::ZERO,
            crypto_status: "ERR".to_string(),
            position_side: PositionSide::Unknown,
            quantity: Decimal::ZERO,
            entry_price: Decimal::ZERO,
            unrealized_pnl: Decimal::ZERO,
        }
    }
}
