//! Volatility indicators.

use trading_core::traits::{BarIndicator, Indicator};
use trading_core::types::Bar;

use crate::moving_average::Sma;

/// True range for every bar. The first bar has no prior close, so its true
/// range is its own high − low.
pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let prev_close = i.checked_sub(1).map(|p| bars[p].close);
            bar.true_range(prev_close)
        })
        .collect()
}

/// Average True Range (ATR).
///
/// Simple rolling mean of the true range over the trailing `period` bars.
/// Values are `None` for the first `period` bars, so every defined value is
/// averaged over true ranges that all had a prior close.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl BarIndicator for Atr {
    type Output = Option<f64>;

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let mut result = Sma::new(self.period).calculate(&true_ranges(bars));
        for value in result.iter_mut().take(self.period) {
            *value = None;
        }
        result
    }

    fn name(&self) -> &str {
        "ATR"
    }
}
