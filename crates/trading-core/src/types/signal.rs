//! Entry signal produced once per new entry-timeframe bar.

use serde::{Deserialize, Serialize};

use super::Direction;

/// Stop-loss and take-profit price levels for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Directional decision for the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Signal {
    #[default]
    None,
    Long { stop_loss: f64, take_profit: f64 },
    Short { stop_loss: f64, take_profit: f64 },
}

impl Signal {
    pub fn new(direction: Direction, levels: RiskLevels) -> Self {
        match direction {
            Direction::Long => Signal::Long {
                stop_loss: levels.stop_loss,
                take_profit: levels.take_profit,
            },
            Direction::Short => Signal::Short {
                stop_loss: levels.stop_loss,
                take_profit: levels.take_profit,
            },
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            Signal::None => None,
            Signal::Long { .. } => Some(Direction::Long),
            Signal::Short { .. } => Some(Direction::Short),
        }
    }

    pub fn levels(&self) -> Option<RiskLevels> {
        match *self {
            Signal::None => None,
            Signal::Long {
                stop_loss,
                take_profit,
            }
            | Signal::Short {
                stop_loss,
                take_profit,
            } => Some(RiskLevels {
                stop_loss,
                take_profit,
            }),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Signal::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_accessors() {
        let levels = RiskLevels {
            stop_loss: 49500.0,
            take_profit: 51250.0,
        };
        let signal = Signal::new(Direction::Long, levels);

        assert_eq!(signal.direction(), Some(Direction::Long));
        assert_eq!(signal.levels(), Some(levels));
        assert!(!signal.is_none());
        assert!(Signal::default().is_none());
        assert_eq!(Signal::None.levels(), None);
    }
}
