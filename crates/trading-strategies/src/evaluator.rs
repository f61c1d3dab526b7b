//! Signal evaluator.
//!
//! Combines the higher-timeframe bias with the entry-timeframe trend, candle and
//! volume filters into a single directional decision per new bar, and prices
//! the structural stop and target for both directions.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trading_core::types::{Bar, BarSeries, Direction, RiskLevels, Signal};
use trading_indicators::IndicatorSnapshot;
use trading_risk::{risk_distance, StopLossMethod};

use crate::{filters, SignalConfig};

/// Everything the evaluator looks at for one entry-timeframe bar.
#[derive(Debug, Clone, Copy)]
pub struct SignalInputs<'a> {
    pub current: &'a Bar,
    pub prior_volume: f64,
    pub snapshot: &'a IndicatorSnapshot,
    pub htf_current: &'a Bar,
    pub htf_prior: &'a Bar,
    /// Throttle allows an entry and no position is open
    pub entry_permitted: bool,
}

impl<'a> SignalInputs<'a> {
    /// Take current/prior bars from both series; `None` if either has fewer than two bars.
    pub fn from_series(
        entry: &'a BarSeries,
        higher: &'a BarSeries,
        snapshot: &'a IndicatorSnapshot,
        entry_permitted: bool,
    ) -> Option<Self> {
        Some(Self {
            current: entry.current()?,
            prior_volume: entry.prior()?.volume,
            snapshot,
            htf_current: higher.current()?,
            htf_prior: higher.prior()?,
            entry_permitted,
        })
    }
}

/// Predicate values behind a decision, kept for the status report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditions {
    pub entry_permitted: bool,
    pub htf_bullish: bool,
    pub htf_bearish: bool,
    pub trend_up: bool,
    pub trend_down: bool,
    pub bullish_candle: bool,
    pub bearish_candle: bool,
    pub volume_confirmed: bool,
}

impl Conditions {
    pub fn long_setup(&self) -> bool {
        self.entry_permitted
            && self.htf_bullish
            && self.trend_up
            && self.bullish_candle
            && self.volume_confirmed
    }

    pub fn short_setup(&self) -> bool {
        self.entry_permitted
            && self.htf_bearish
            && self.trend_down
            && self.bearish_candle
            && self.volume_confirmed
    }
}

/// Result of evaluating one bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub signal: Signal,
    pub conditions: Conditions,
    pub long_levels: RiskLevels,
    pub short_levels: RiskLevels,
    /// Set when a setup fired but its stop sat on the wrong side of close
    pub suppressed: Option<Direction>,
}

/// Produces a [`Signal`] per new entry-timeframe bar.
#[derive(Debug, Clone)]
pub struct SignalEvaluator {
    config: SignalConfig,
    stops: StopLossMethod,
}

impl SignalEvaluator {
    pub fn new(config: SignalConfig) -> Self {
        let stops = config.stop_loss_method();
        Self { config, stops }
    }

    pub fn conditions(&self, inputs: &SignalInputs<'_>) -> Conditions {
        let close = inputs.current.close;
        Conditions {
            entry_permitted: inputs.entry_permitted,
            htf_bullish: filters::htf_bullish(inputs.htf_current),
            htf_bearish: filters::htf_bearish(inputs.htf_current),
            trend_up: filters::trend_up(close, inputs.snapshot, &self.config),
            trend_down: filters::trend_down(close, inputs.snapshot, &self.config),
            bullish_candle: filters::bullish_candle(inputs.current, &self.config),
            bearish_candle: filters::bearish_candle(inputs.current, &self.config),
            volume_confirmed: filters::volume_confirmed(
                inputs.current.volume,
                inputs.prior_volume,
                &self.config,
            ),
        }
    }

    pub fn evaluate(&self, inputs: &SignalInputs<'_>) -> Evaluation {
        let close = inputs.current.close;
        let atr = inputs.snapshot.average_true_range;
        let conditions = self.conditions(inputs);

        let long_levels = self.stops.long_levels(close, inputs.htf_prior, atr);
        let short_levels = self.stops.short_levels(close, inputs.htf_prior, atr);

        // Opposite HTF bias requirements make these mutually exclusive
        let candidate = if conditions.long_setup() {
            Some((Direction::Long, long_levels))
        } else if conditions.short_setup() {
            Some((Direction::Short, short_levels))
        } else {
            None
        };

        let mut suppressed = None;
        let signal = match candidate {
            Some((direction, levels)) => {
                let distance = risk_distance(direction, close, levels.stop_loss);
                if distance > 0.0 && distance.is_finite() {
                    debug!(%direction, close, ?levels, "Entry setup confirmed");
                    Signal::new(direction, levels)
                } else {
                    warn!(
                        %direction,
                        close,
                        stop_loss = levels.stop_loss,
                        "Degenerate risk distance, signal suppressed"
                    );
                    suppressed = Some(direction);
                    Signal::None
                }
            }
            None => Signal::None,
        };

        Evaluation {
            signal,
            conditions,
            long_levels,
            short_levels,
            suppressed,
        }
    }
}
