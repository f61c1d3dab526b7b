//! CLI command implementations.

pub mod live;
pub mod paper;
pub mod status;
pub mod validate;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use trading_broker::{AlpacaBroker, AlpacaConfig};
use trading_config::{AppConfig, Credentials};
use trading_core::traits::{Broker, MarketData};
use trading_data::{AlpacaCryptoData, AlpacaDataConfig};
use trading_engine::{CycleDriver, EngineConfig};
use trading_monitor::{
    spawn_health_server, ChatNotifier, EmailNotifier, HealthState, NotificationHub,
};

/// Validated settings plus the secrets they reference.
pub(crate) fn prepare(settings: &AppConfig) -> Result<Credentials> {
    settings.validate()?;
    Ok(Credentials::from_env(settings)?)
}

/// Trading endpoint settings; `alpaca.paper` is the only paper/live switch.
fn alpaca_config(settings: &AppConfig, creds: &Credentials) -> AlpacaConfig {
    let config = AlpacaConfig::new(
        creds.alpaca_key.clone(),
        creds.alpaca_secret.clone(),
        settings.alpaca.paper,
    )
    .with_timeout(settings.engine.call_timeout_secs);
    match &settings.alpaca.base_url {
        Some(url) => config.with_base_url(url.clone()),
        None => config,
    }
}

pub(crate) fn alpaca_broker(settings: &AppConfig, creds: &Credentials) -> Result<AlpacaBroker> {
    Ok(AlpacaBroker::new(alpaca_config(settings, creds))?)
}

pub(crate) fn market_data(settings: &AppConfig, creds: &Credentials) -> Result<AlpacaCryptoData> {
    let config = AlpacaDataConfig {
        data_url: settings.alpaca.data_url.clone(),
        timeout_secs: settings.engine.call_timeout_secs,
        ..Default::default()
    }
    .with_credentials(creds.alpaca_key.clone(), creds.alpaca_secret.clone());
    Ok(AlpacaCryptoData::new(config)?)
}

pub(crate) fn notification_hub(settings: &AppConfig, creds: &Credentials) -> Result<NotificationHub> {
    let timeout = Duration::from_secs(settings.engine.call_timeout_secs);
    let mut hub = NotificationHub::new();

    if let Some((user, password)) = &creds.email {
        let email = &settings.notifications.email;
        let notifier = EmailNotifier::new(
            &email.smtp_host,
            email.smtp_port,
            user,
            password,
            &email.recipients,
            timeout,
        )
        .context("email channel")?;
        hub = hub.with_channel(Arc::new(notifier));
    }

    if let Some(url) = &creds.chat_webhook_url {
        hub = hub.with_channel(Arc::new(ChatNotifier::new(url, timeout).context("chat channel")?));
    }

    if hub.is_empty() {
        warn!("No notification channels enabled");
    } else {
        info!(channels = ?hub.channel_names(), "Notification channels ready");
    }
    Ok(hub)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Cannot listen for Ctrl-C, running until killed: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Start the liveness endpoint and run the trading loop until Ctrl-C.
pub(crate) async fn run_controller(
    settings: &AppConfig,
    broker: Arc<dyn Broker>,
    data: Arc<dyn MarketData>,
    hub: NotificationHub,
) -> Result<()> {
    let config = EngineConfig::from_settings(settings)?;

    let health = if settings.health.enabled {
        let state = HealthState {
            label: format!("Alpaca {} Bot", config.symbol),
            timezone: config.timezone,
        };
        let (_, handle) = spawn_health_server(
            &settings.health.bind,
            settings.health.resolved_port(),
            state,
        )
        .await
        .context("starting health endpoint")?;
        Some(handle)
    } else {
        None
    };

    let mut driver = CycleDriver::new(config, broker, data, hub);
    driver.startup().await;
    driver.run(shutdown_signal()).await;

    if let Some(handle) = health {
        handle.abort();
    }
    let throttle = driver.state().throttle.state();
    info!(
        symbol = %driver.config().symbol,
        trades_today = throttle.trades_opened_today,
        holding = !driver.state().tracker.is_flat(),
        "Controller stopped"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials {
            alpaca_key: "k".into(),
            alpaca_secret: "s".into(),
            email: None,
            chat_webhook_url: None,
        }
    }

    #[test]
    fn test_alpaca_endpoint_follows_settings() {
        let mut settings = AppConfig::default();
        settings.alpaca.paper = true;
        assert_eq!(
            alpaca_config(&settings, &creds()).base_url(),
            "https://paper-api.alpaca.markets"
        );

        settings.alpaca.paper = false;
        assert_eq!(
            alpaca_config(&settings, &creds()).base_url(),
            "https://api.alpaca.markets"
        );

        settings.alpaca.base_url = Some("http://localhost:9000".into());
        assert_eq!(
            alpaca_config(&settings, &creds()).base_url(),
            "http://localhost:9000"
        );
    }
}
