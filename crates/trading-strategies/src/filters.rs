//! Entry predicates.
//!
//! Candle direction and higher-timeframe bias are always applied; the body,
//! volume and EMA/VWAP trend filters can each be switched off, in which case
//! they pass.

use trading_core::types::Bar;
use trading_indicators::IndicatorSnapshot;

use crate::SignalConfig;

pub fn bullish_candle(bar: &Bar, config: &SignalConfig) -> bool {
    bar.is_bullish() && (!config.use_body_filter || bar.body_fraction() >= config.min_body_fraction)
}

pub fn bearish_candle(bar: &Bar, config: &SignalConfig) -> bool {
    bar.is_bearish() && (!config.use_body_filter || bar.body_fraction() >= config.min_body_fraction)
}

pub fn volume_confirmed(current_volume: f64, prior_volume: f64, config: &SignalConfig) -> bool {
    !config.use_volume_filter || current_volume >= prior_volume * config.volume_multiplier
}

pub fn trend_up(close: f64, snapshot: &IndicatorSnapshot, config: &SignalConfig) -> bool {
    !config.use_ema_filter
        || (snapshot.fast_average > snapshot.slow_average && close > snapshot.session_vwap)
}

pub fn trend_down(close: f64, snapshot: &IndicatorSnapshot, config: &SignalConfig) -> bool {
    !config.use_ema_filter
        || (snapshot.fast_average < snapshot.slow_average && close < snapshot.session_vwap)
}

pub fn htf_bullish(htf_current: &Bar) -> bool {
    htf_current.is_bullish()
}

pub fn htf_bearish(htf_current: &Bar) -> bool {
    htf_current.is_bearish()
}
