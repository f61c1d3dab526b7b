//! Stop-loss and take-profit levels.

use serde::{Deserialize, Serialize};
use trading_core::types::{Bar, Direction, RiskLevels};

/// Structural stop placement: beyond the prior higher-timeframe bar's extreme,
/// padded by a multiple of ATR, with the target at a fixed risk:reward multiple.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StopLossMethod {
    /// ATR multiple added beyond the structural level
    pub atr_buffer: f64,
    /// Target distance as a multiple of risk distance
    pub risk_reward: f64,
}

impl StopLossMethod {
    pub fn new(atr_buffer: f64, risk_reward: f64) -> Self {
        Self {
            atr_buffer,
            risk_reward,
        }
    }

    /// Long levels: stop below the prior higher-timeframe low.
    pub fn long_levels(&self, close: f64, prior_htf: &Bar, atr: f64) -> RiskLevels {
        let stop_loss = prior_htf.low - atr * self.atr_buffer;
        RiskLevels {
            stop_loss,
            take_profit: close + (close - stop_loss) * self.risk_reward,
        }
    }

    /// Short levels: stop above the prior higher-timeframe high.
    pub fn short_levels(&self, close: f64, prior_htf: &Bar, atr: f64) -> RiskLevels {
        let stop_loss = prior_htf.high + atr * self.atr_buffer;
        RiskLevels {
            stop_loss,
            take_profit: close - (stop_loss - close) * self.risk_reward,
        }
    }
}

/// Signed distance from `reference` to the stop on the loss side.
///
/// Positive when the stop sits below a long (or above a short); zero or negative
/// means the levels are degenerate and must not be traded.
pub fn risk_distance(direction: Direction, reference: f64, stop_loss: f64) -> f64 {
    match direction {
        Direction::Long => reference - stop_loss,
        Direction::Short => stop_loss - reference,
    }
}

/// Check if a stop at `stop_price` is hit by `current_price`.
pub fn is_triggered(direction: Direction, stop_price: f64, current_price: f64) -> bool {
    match direction {
        Direction::Long => current_price <= stop_price,
        Direction::Short => current_price >= stop_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prior_htf() -> Bar {
        Bar::new(0, 50_100.0, 50_400.0, 49_600.0, 50_200.0, 10.0)
    }

    #[test]
    fn test_long_levels() {
        let method = StopLossMethod::new(0.1, 2.5);
        let levels = method.long_levels(50_000.0, &prior_htf(), 100.0);

        assert!((levels.stop_loss - 49_590.0).abs() < 1e-9); // 49600 - 100*0.1
        assert!((levels.take_profit - 51_025.0).abs() < 1e-9); // 50000 + 410*2.5
        assert!(risk_distance(Direction::Long, 50_000.0, levels.stop_loss) > 0.0);
    }

    #[test]
    fn test_short_levels() {
        let method = StopLossMethod::new(0.1, 2.5);
        let levels = method.short_levels(50_000.0, &prior_htf(), 100.0);

        assert!((levels.stop_loss - 50_410.0).abs() < 1e-9); // 50400 + 100*0.1
        assert!((levels.take_profit - 48_975.0).abs() < 1e-9); // 50000 - 410*2.5
        assert!(risk_distance(Direction::Short, 50_000.0, levels.stop_loss) > 0.0);
    }

    #[test]
    fn test_degenerate_long_when_close_below_structure() {
        // Close already under the prior HTF low: the "stop" ends up above close
        let method = StopLossMethod::new(0.1, 2.5);
        let levels = method.long_levels(49_000.0, &prior_htf(), 100.0);

        assert!(risk_distance(Direction::Long, 49_000.0, levels.stop_loss) <= 0.0);
        // And the target lands on the loss side as well
        assert!(levels.take_profit < 49_000.0);
    }

    #[test]
    fn test_stop_triggered() {
        assert!(is_triggered(Direction::Long, 95.0, 94.0));
        assert!(is_triggered(Direction::Long, 95.0, 95.0));
        assert!(!is_triggered(Direction::Long, 95.0, 96.0));

        assert!(is_triggered(Direction::Short, 105.0, 106.0));
        assert!(!is_triggered(Direction::Short, 105.0, 104.0));
    }
}
