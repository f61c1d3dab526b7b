//! Signal evaluator configuration.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use trading_core::{error::StrategyError, traits::StrategyConfig};
use trading_indicators::IndicatorParams;
use trading_risk::StopLossMethod;

/// Thresholds and filter toggles for the HTF-bias trend strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    /// Fast EMA period
    pub ema_fast: usize,
    /// Slow EMA period
    pub ema_slow: usize,
    /// ATR period
    pub atr_period: usize,
    /// ATR multiple added beyond the prior HTF extreme
    pub atr_stop_buffer: f64,
    /// Take-profit distance as a multiple of risk distance
    pub risk_reward: f64,
    /// Minimum |close - open| / range for a qualifying candle
    pub min_body_fraction: f64,
    /// Current volume must reach prior volume times this
    pub volume_multiplier: f64,
    pub use_body_filter: bool,
    pub use_volume_filter: bool,
    pub use_ema_filter: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            atr_period: 14,
            atr_stop_buffer: 0.1,
            risk_reward: 2.5,
            min_body_fraction: 0.20,
            volume_multiplier: 1.05,
            use_body_filter: false,
            use_volume_filter: false,
            use_ema_filter: true,
        }
    }
}

impl SignalConfig {
    pub fn indicator_params(&self, session_tz: Tz) -> IndicatorParams {
        IndicatorParams {
            ema_fast: self.ema_fast,
            ema_slow: self.ema_slow,
            atr_period: self.atr_period,
            session_tz,
        }
    }

    pub fn stop_loss_method(&self) -> StopLossMethod {
        StopLossMethod::new(self.atr_stop_buffer, self.risk_reward)
    }
}

impl StrategyConfig for SignalConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.ema_fast == 0 || self.atr_period == 0 {
            return Err(StrategyError::InvalidConfig(
                "EMA and ATR periods must be greater than 0".into(),
            ));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(StrategyError::InvalidConfig(
                "Fast EMA period must be less than slow EMA period".into(),
            ));
        }
        if !(self.risk_reward > 0.0) {
            return Err(StrategyError::InvalidConfig(
                "Risk:reward ratio must be positive".into(),
            ));
        }
        if !(self.atr_stop_buffer >= 0.0) {
            return Err(StrategyError::InvalidConfig(
                "ATR stop buffer must not be negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_body_fraction) {
            return Err(StrategyError::InvalidConfig(
                "Minimum body fraction must be within [0, 1]".into(),
            ));
        }
        if !(self.volume_multiplier >= 0.0) {
            return Err(StrategyError::InvalidConfig(
                "Volume multiplier must not be negative".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SignalConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SignalConfig::default();
        config.ema_fast = 21;
        assert!(config.validate().is_err());

        let mut config = SignalConfig::default();
        config.risk_reward = 0.0;
        assert!(config.validate().is_err());

        let mut config = SignalConfig::default();
        config.risk_reward = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = SignalConfig::default();
        config.min_body_fraction = 1.5;
        assert!(config.validate().is_err());

        let mut config = SignalConfig::default();
        config.atr_period = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_indicator_params() {
        let params = SignalConfig::default().indicator_params(chrono_tz::Europe::Moscow);
        assert_eq!(params.ema_fast, 9);
        assert_eq!(params.ema_slow, 21);
        assert_eq!(params.atr_period, 14);
    }
}
