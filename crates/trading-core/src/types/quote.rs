//! Top-of-book quote.

use serde::{Deserialize, Serialize};

use super::Direction;

/// Best bid/ask at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    pub bid: f64,
    pub ask: f64,
}

impl Quote {
    pub fn new(bid: f64, ask: f64) -> Self {
        Self { bid, ask }
    }

    /// Zeroed quote standing in for a failed fetch.
    pub fn zeroed() -> Self {
        Self::default()
    }

    /// A quote with a non-positive side cannot be traded against.
    pub fn is_valid(&self) -> bool {
        self.bid > 0.0 && self.ask > 0.0 && self.bid.is_finite() && self.ask.is_finite()
    }

    /// Indicative fill price when opening in `direction`.
    pub fn entry_price(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Long => self.ask,
            Direction::Short => self.bid,
        }
    }

    /// Price at which a position in `direction` could be closed: the bid for a
    /// long, the ask for a short.
    pub fn exit_price(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Long => self.bid,
            Direction::Short => self.ask,
        }
    }

    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }
}
