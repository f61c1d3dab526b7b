//! Signal evaluation for the BTC/USD trend strategy.
//!
//! A long needs a bullish higher-timeframe bar, an entry-timeframe uptrend
//! (fast EMA above slow EMA and close above session VWAP), a bullish candle and
//! confirmed volume. Shorts mirror this. Stops sit beyond the prior
//! higher-timeframe bar's extreme, padded by ATR.

mod config;
mod evaluator;
pub mod filters;

pub use config::SignalConfig;
pub use evaluator::{Conditions, Evaluation, SignalEvaluator, SignalInputs};
