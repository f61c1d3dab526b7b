//! Per-bar indicator snapshot recomputed from the full series each cycle.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use trading_core::error::IndicatorError;
use trading_core::traits::{BarIndicator, Indicator};
use trading_core::types::BarSeries;

use crate::{Atr, Ema, SessionVwap};

/// Periods and session timezone for the indicator engine.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorParams {
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub atr_period: usize,
    pub session_tz: Tz,
}

/// Indicator values for the current (most recent) bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub fast_average: f64,
    pub slow_average: f64,
    pub average_true_range: f64,
    pub session_vwap: f64,
}

impl IndicatorSnapshot {
    /// Compute every indicator over `series` and keep the last value of each.
    ///
    /// Fails when the ATR is still undefined at the current bar or when any
    /// value is not finite; no decision may be taken on such a snapshot.
    pub fn compute(series: &BarSeries, params: &IndicatorParams) -> Result<Self, IndicatorError> {
        if params.ema_fast == 0 || params.ema_slow == 0 || params.atr_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "indicator periods must be greater than 0".into(),
            ));
        }

        let bars = series.bars();
        if bars.len() <= params.atr_period {
            return Err(IndicatorError::InsufficientData {
                required: params.atr_period + 1,
                available: bars.len(),
            });
        }

        let closes = series.closes();
        let fast = Ema::new(params.ema_fast).calculate(&closes);
        let slow = Ema::new(params.ema_slow).calculate(&closes);
        let atr = Atr::new(params.atr_period).calculate(bars);
        let vwap = SessionVwap::new(params.session_tz).calculate(bars);

        let missing = || IndicatorError::InsufficientData {
            required: params.atr_period + 1,
            available: bars.len(),
        };

        let snapshot = Self {
            fast_average: *fast.last().ok_or_else(missing)?,
            slow_average: *slow.last().ok_or_else(missing)?,
            average_true_range: atr.last().copied().flatten().ok_or_else(missing)?,
            session_vwap: *vwap.last().ok_or_else(missing)?,
        };

        if !snapshot.is_finite() {
            return Err(IndicatorError::CalculationError(format!(
                "non-finite indicator value: {:?}",
                snapshot
            )));
        }

        Ok(snapshot)
    }

    fn is_finite(&self) -> bool {
        self.fast_average.is_finite()
            && self.slow_average.is_finite()
            && self.average_true_range.is_finite()
            && self.session_vwap.is_finite()
    }
}
