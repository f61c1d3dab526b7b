//! Configuration management.
//!
//! Settings come from a TOML file overlaid with `TRADING__SECTION__KEY`
//! environment variables. Secrets are never read from the file: [`Credentials`]
//! pulls them from the environment after loading `.env`.

mod settings;

pub use settings::{
    AlpacaSettings, AppConfig, AppSettings, ChatSettings, EmailSettings, EngineSettings,
    HealthSettings, LoggingConfig, NotificationSettings, StrategySettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;
use thiserror::Error;
use trading_core::traits::StrategyConfig;

/// Fewest entry-timeframe bars a cycle may decide on.
pub const MIN_ENTRY_HISTORY: usize = 50;
/// Fewest higher-timeframe bars a cycle may decide on.
pub const MIN_HIGHER_HISTORY: usize = 10;

/// Startup configuration failures. Any of these prevents the controller from starting.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),
}

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("TRADING")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Load `.env` (if present) into the process environment.
pub fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }
}

impl AppConfig {
    /// Range and consistency checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let strategy = &self.strategy;

        strategy
            .signal_config()
            .validate()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        strategy.timezone().map_err(SettingsError::Invalid)?;

        if strategy.symbol.trim().is_empty() {
            return Err(SettingsError::Invalid("strategy.symbol is empty".into()));
        }
        if strategy.lot_size <= rust_decimal::Decimal::ZERO {
            return Err(SettingsError::Invalid(
                "strategy.lot_size must be positive".into(),
            ));
        }
        if strategy.higher_timeframe.as_secs() <= strategy.entry_timeframe.as_secs() {
            return Err(SettingsError::Invalid(format!(
                "higher timeframe {} must be longer than entry timeframe {}",
                strategy.higher_timeframe, strategy.entry_timeframe
            )));
        }

        let engine = &self.engine;
        if engine.poll_interval_secs == 0 {
            return Err(SettingsError::Invalid(
                "engine.poll_interval_secs must be greater than 0".into(),
            ));
        }
        if engine.call_timeout_secs == 0 {
            return Err(SettingsError::Invalid(
                "engine.call_timeout_secs must be greater than 0".into(),
            ));
        }
        if engine.min_entry_bars < MIN_ENTRY_HISTORY {
            return Err(SettingsError::Invalid(format!(
                "engine.min_entry_bars ({}) must be at least {}",
                engine.min_entry_bars, MIN_ENTRY_HISTORY
            )));
        }
        if engine.min_entry_bars <= strategy.atr_period {
            return Err(SettingsError::Invalid(format!(
                "engine.min_entry_bars ({}) must exceed the ATR period ({})",
                engine.min_entry_bars, strategy.atr_period
            )));
        }
        if engine.min_higher_bars < MIN_HIGHER_HISTORY {
            return Err(SettingsError::Invalid(format!(
                "engine.min_higher_bars ({}) must be at least {}",
                engine.min_higher_bars, MIN_HIGHER_HISTORY
            )));
        }
        if engine.entry_bar_limit < engine.min_entry_bars
            || engine.higher_bar_limit < engine.min_higher_bars
        {
            return Err(SettingsError::Invalid(
                "bar fetch limits must not be below the minimum history".into(),
            ));
        }

        let email = &self.notifications.email;
        if email.enabled && email.recipients.is_empty() {
            return Err(SettingsError::Invalid(
                "notifications.email is enabled without recipients".into(),
            ));
        }

        Ok(())
    }
}

/// Secrets read from the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub alpaca_key: String,
    pub alpaca_secret: String,
    pub email: Option<(String, String)>,
    pub chat_webhook_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("alpaca_key", &"***")
            .field("alpaca_secret", &"***")
            .field("email", &self.email.as_ref().map(|(user, _)| user))
            .field("chat_webhook_url", &self.chat_webhook_url.is_some())
            .finish()
    }
}

impl Credentials {
    /// Read credentials for every enabled collaborator.
    ///
    /// Alpaca keys are always required; email and chat secrets only when those
    /// channels are enabled.
    pub fn from_env(config: &AppConfig) -> Result<Self, SettingsError> {
        Self::from_lookup(config, |name| std::env::var(name).ok())
    }

    fn from_lookup<F>(config: &AppConfig, lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| SettingsError::MissingCredential(name.to_string()))
        };

        let alpaca_key = required(&config.alpaca.api_key_env)?;
        let alpaca_secret = required(&config.alpaca.api_secret_env)?;

        let email_cfg = &config.notifications.email;
        let email = if email_cfg.enabled {
            Some((
                required(&email_cfg.username_env)?,
                required(&email_cfg.password_env)?,
            ))
        } else {
            None
        };

        let chat_cfg = &config.notifications.chat;
        let chat_webhook_url = if chat_cfg.enabled {
            Some(required(&chat_cfg.webhook_url_env)?)
        } else {
            None
        };

        Ok(Self {
            alpaca_key,
            alpaca_secret,
            email,
            chat_webhook_url,
        })
    }
}
