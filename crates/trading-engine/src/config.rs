//! Runtime configuration for the cycle driver.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::time::Duration;
use trading_config::{AppConfig, SettingsError};
use trading_core::types::Timeframe;
use trading_risk::ThrottleLimits;
use trading_strategies::SignalConfig;

/// Resolved settings the driver runs with.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub symbol: String,
    pub lot_size: Decimal,
    pub entry_timeframe: Timeframe,
    pub higher_timeframe: Timeframe,
    /// Trading-day boundaries, session VWAP and display
    pub timezone: Tz,
    pub entry_bar_limit: usize,
    pub higher_bar_limit: usize,
    pub min_entry_bars: usize,
    pub min_higher_bars: usize,
    pub poll_interval: Duration,
    pub retry_backoff: Duration,
    pub buying_power_floor: Decimal,
    pub reset_wait: Duration,
    pub signal: SignalConfig,
    pub throttle: ThrottleLimits,
}

impl EngineConfig {
    pub fn from_settings(config: &AppConfig) -> Result<Self, SettingsError> {
        let strategy = &config.strategy;
        let engine = &config.engine;

        Ok(Self {
            symbol: strategy.symbol.clone(),
            lot_size: strategy.lot_size,
            entry_timeframe: strategy.entry_timeframe,
            higher_timeframe: strategy.higher_timeframe,
            timezone: strategy.timezone().map_err(SettingsError::Invalid)?,
            entry_bar_limit: engine.entry_bar_limit,
            higher_bar_limit: engine.higher_bar_limit,
            min_entry_bars: engine.min_entry_bars,
            min_higher_bars: engine.min_higher_bars,
            poll_interval: Duration::from_secs(engine.poll_interval_secs),
            retry_backoff: Duration::from_secs(engine.retry_backoff_secs),
            buying_power_floor: engine.buying_power_floor,
            reset_wait: Duration::from_secs(engine.reset_wait_secs),
            signal: strategy.signal_config(),
            throttle: strategy.throttle_limits(),
        })
    }

    /// Base asset of the traded pair (`BTC` for `BTC/USD`).
    pub fn asset(&self) -> &str {
        self.symbol.split('/').next().unwrap_or(&self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_settings() {
        let config = EngineConfig::from_settings(&AppConfig::default()).unwrap();

        assert_eq!(config.symbol, "BTC/USD");
        assert_eq!(config.asset(), "BTC");
        assert_eq!(config.timezone, chrono_tz::Europe::Moscow);
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.reset_wait, Duration::from_secs(3));
        assert_eq!(config.throttle.max_trades_per_day, 10);
        assert_eq!(config.signal.risk_reward, 2.5);
    }

    #[test]
    fn test_bad_timezone_is_rejected() {
        let mut settings = AppConfig::default();
        settings.strategy.timezone = "Nowhere/Special".into();
        assert!(matches!(
            EngineConfig::from_settings(&settings),
            Err(SettingsError::Invalid(_))
        ));
    }
}
