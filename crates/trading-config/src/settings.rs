//! Configuration structures.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use trading_core::types::Timeframe;
use trading_risk::ThrottleLimits;
use trading_strategies::SignalConfig;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub alpaca: AlpacaSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub health: HealthSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "btc-trader".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Alpaca API configuration. Credentials live in the environment, named here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlpacaSettings {
    pub paper: bool,
    pub api_key_env: String,
    pub api_secret_env: String,
    /// Overrides the paper/live trading URL
    pub base_url: Option<String>,
    pub data_url: String,
}

impl Default for AlpacaSettings {
    fn default() -> Self {
        Self {
            paper: true,
            api_key_env: "ALPACA_KEY".to_string(),
            api_secret_env: "ALPACA_SECRET".to_string(),
            base_url: None,
            data_url: "https://data.alpaca.markets".to_string(),
        }
    }
}

/// Instrument, timeframes and strategy parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    pub symbol: String,
    pub lot_size: Decimal,
    pub risk_reward: f64,
    pub max_trades_per_day: u32,
    pub cooldown_bars: u32,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub atr_period: usize,
    pub atr_stop_buffer: f64,
    pub min_body_fraction: f64,
    pub volume_multiplier: f64,
    pub use_body_filter: bool,
    pub use_volume_filter: bool,
    pub use_ema_filter: bool,
    pub entry_timeframe: Timeframe,
    pub higher_timeframe: Timeframe,
    /// IANA name used for trading days, session VWAP and display
    pub timezone: String,
}

impl Default for StrategySettings {
    fn default() -> Self {
        let signal = SignalConfig::default();
        Self {
            symbol: "BTC/USD".to_string(),
            lot_size: dec!(0.01),
            risk_reward: signal.risk_reward,
            max_trades_per_day: 10,
            cooldown_bars: 10,
            ema_fast: signal.ema_fast,
            ema_slow: signal.ema_slow,
            atr_period: signal.atr_period,
            atr_stop_buffer: signal.atr_stop_buffer,
            min_body_fraction: signal.min_body_fraction,
            volume_multiplier: signal.volume_multiplier,
            use_body_filter: signal.use_body_filter,
            use_volume_filter: signal.use_volume_filter,
            use_ema_filter: signal.use_ema_filter,
            entry_timeframe: Timeframe::minutes(5),
            higher_timeframe: Timeframe::minutes(30),
            timezone: "Europe/Moscow".to_string(),
        }
    }
}

impl StrategySettings {
    pub fn signal_config(&self) -> SignalConfig {
        SignalConfig {
            ema_fast: self.ema_fast,
            ema_slow: self.ema_slow,
            atr_period: self.atr_period,
            atr_stop_buffer: self.atr_stop_buffer,
            risk_reward: self.risk_reward,
            min_body_fraction: self.min_body_fraction,
            volume_multiplier: self.volume_multiplier,
            use_body_filter: self.use_body_filter,
            use_volume_filter: self.use_volume_filter,
            use_ema_filter: self.use_ema_filter,
        }
    }

    pub fn throttle_limits(&self) -> ThrottleLimits {
        ThrottleLimits {
            max_trades_per_day: self.max_trades_per_day,
            cooldown_bars: self.cooldown_bars,
        }
    }

    pub fn timezone(&self) -> Result<Tz, String> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| format!("unknown timezone '{}': {}", self.timezone, e))
    }
}

/// Cycle driver timing, history and account settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Sleep between iterations
    pub poll_interval_secs: u64,
    /// Back-off after a data failure
    pub retry_backoff_secs: u64,
    pub entry_bar_limit: usize,
    pub higher_bar_limit: usize,
    pub min_entry_bars: usize,
    pub min_higher_bars: usize,
    /// Per-request timeout for data and broker calls
    pub call_timeout_secs: u64,
    /// Buying power below this triggers a paper balance reset
    pub buying_power_floor: Decimal,
    pub reset_wait_secs: u64,
    /// Starting cash for the local paper broker
    pub paper_initial_cash: Decimal,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 1,
            retry_backoff_secs: 5,
            entry_bar_limit: 200,
            higher_bar_limit: 100,
            min_entry_bars: 50,
            min_higher_bars: 10,
            call_timeout_secs: 10,
            buying_power_floor: dec!(500),
            reset_wait_secs: 3,
            paper_initial_cash: dec!(100000),
        }
    }
}

/// Notification channels.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NotificationSettings {
    pub email: EmailSettings,
    pub chat: ChatSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub enabled: bool,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub username_env: String,
    pub password_env: String,
    pub recipients: Vec<String>,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            username_env: "EMAIL_USER".to_string(),
            password_env: "EMAIL_PASS".to_string(),
            recipients: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub enabled: bool,
    pub webhook_url_env: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            webhook_url_env: "CHAT_WEBHOOK_URL".to_string(),
        }
    }
}

/// Liveness endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthSettings {
    pub enabled: bool,
    pub bind: String,
    pub port: u16,
    /// Hosting platforms inject the listen port through this variable
    pub port_env: String,
}

impl Default for HealthSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "0.0.0.0".to_string(),
            port: 8080,
            port_env: "PORT".to_string(),
        }
    }
}

impl HealthSettings {
    /// Port from `port_env` when set and numeric, else the configured port.
    pub fn resolved_port(&self) -> u16 {
        std::env::var(&self.port_env)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(self.port)
    }
}
