//! Indicator engine.
//!
//! Pure functions over a bar series, recomputed from scratch every cycle:
//! - Exponential moving average seeded with the first close
//! - Average True Range as a simple rolling mean of the true range
//! - Volume-weighted average price anchored to the session's calendar day
//!
//! [`IndicatorSnapshot`] bundles the current bar's values for the signal evaluator.

pub mod moving_average;
pub mod snapshot;
pub mod volatility;
pub mod vwap;

pub use moving_average::{Ema, Sma};
pub use snapshot::{IndicatorParams, IndicatorSnapshot};
pub use volatility::{true_ranges, Atr};
pub use vwap::SessionVwap;
