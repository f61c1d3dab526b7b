//! Alpaca trading API integration for paper and live crypto accounts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header, Client, Response, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use trading_core::error::BrokerError;
use trading_core::traits::Broker;
use trading_core::types::{AccountInfo, BrokerPosition, Order, OrderRequest, OrderStatus, Side};
use tracing::{debug, info};

const PAPER_URL: &str = "https://paper-api.alpaca.markets";
const LIVE_URL: &str = "https://api.alpaca.markets";

/// Alpaca API configuration.
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    pub api_key: String,
    pub api_secret: String,
    pub paper: bool,
    /// Overrides the paper/live trading URL
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl AlpacaConfig {
    /// Create config directly with key and secret.
    pub fn new(api_key: String, api_secret: String, paper: bool) -> Self {
        Self {
            api_key,
            api_secret,
            paper,
            base_url: None,
            timeout_secs: 10,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/'),
            None if self.paper => PAPER_URL,
            None => LIVE_URL,
        }
    }

    /// Authenticated client with the per-request timeout applied.
    pub fn http_client(&self) -> Result<Client, BrokerError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "APCA-API-KEY-ID",
            header::HeaderValue::from_str(&self.api_key)
                .map_err(|e| BrokerError::Configuration(e.to_string()))?,
        );
        headers.insert(
            "APCA-API-SECRET-KEY",
            header::HeaderValue::from_str(&self.api_secret)
                .map_err(|e| BrokerError::Configuration(e.to_string()))?,
        );

        Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| BrokerError::Connection(e.to_string()))
    }
}

/// Alpaca API response types
#[derive(Debug, Deserialize)]
struct AlpacaAccount {
    equity: String,
    buying_power: String,
    #[serde(default)]
    non_marginable_buying_power: Option<String>,
    #[serde(default)]
    crypto_status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlpacaPosition {
    symbol: String,
    qty: String,
    avg_entry_price: String,
    #[serde(default)]
    current_price: Option<String>,
    #[serde(default)]
    unrealized_pl: Option<String>,
    side: String,
}

#[derive(Debug, Deserialize)]
struct AlpacaOrder {
    id: String,
    status: String,
    symbol: String,
    #[serde(default)]
    qty: Option<String>,
    filled_qty: String,
    side: String,
    filled_avg_price: Option<String>,
    created_at: String,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    symbol: &'a str,
    qty: String,
    side: &'a str,
    #[serde(rename = "type")]
    order_type: &'a str,
    time_in_force: &'a str,
}

/// Alpaca broker client.
pub struct AlpacaBroker {
    config: AlpacaConfig,
    client: Client,
}

impl AlpacaBroker {
    /// Create a new Alpaca broker client.
    pub fn new(config: AlpacaConfig) -> Result<Self, BrokerError> {
        let client = config.http_client()?;
        Ok(Self { config, client })
    }

    fn request_error(&self, e: reqwest::Error) -> BrokerError {
        if e.is_timeout() {
            BrokerError::Timeout(self.config.timeout_secs)
        } else {
            BrokerError::Connection(e.to_string())
        }
    }

    /// Map non-success responses to broker errors.
    async fn check(resp: Response) -> Result<Response, BrokerError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(60);
            return Err(BrokerError::RateLimited { retry_after_secs });
        }

        let text = resp.text().await.unwrap_or_default();
        Err(BrokerError::ApiError(format!("{}: {}", status, text)))
    }
}

/// Positions are addressed without the pair separator (`BTC/USD` -> `BTCUSD`).
fn position_path_symbol(symbol: &str) -> String {
    symbol.replace('/', "")
}

fn parse_decimal(value: &str) -> Decimal {
    value.parse().unwrap_or(dec!(0))
}

fn parse_account(account: AlpacaAccount) -> AccountInfo {
    AccountInfo {
        equity: parse_decimal(&account.equity),
        buying_power: parse_decimal(&account.buying_power),
        non_marginable_buying_power: account
            .non_marginable_buying_power
            .as_deref()
            .and_then(|v| v.parse().ok()),
        crypto_status: account.crypto_status,
    }
}

fn parse_position(p: AlpacaPosition) -> BrokerPosition {
    let qty = parse_decimal(&p.qty).abs();
    // Alpaca reports short quantity either negative or with side=short
    let quantity = if p.side == "short" { -qty } else { qty };

    BrokerPosition {
        symbol: p.symbol,
        quantity,
        avg_entry_price: parse_decimal(&p.avg_entry_price),
        current_price: p.current_price.as_deref().map(parse_decimal).unwrap_or_default(),
        unrealized_pnl: p.unrealized_pl.as_deref().map(parse_decimal).unwrap_or_default(),
    }
}

fn parse_order(order: AlpacaOrder) -> Result<Order, BrokerError> {
    let side = match order.side.as_str() {
        "buy" => Side::Buy,
        "sell" => Side::Sell,
        _ => return Err(BrokerError::ApiError(format!("Unknown side: {}", order.side))),
    };

    let created_at = DateTime::parse_from_rfc3339(&order.created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now());

    Ok(Order {
        id: order.id,
        symbol: order.symbol,
        side,
        quantity: order.qty.as_deref().map(parse_decimal).unwrap_or_default(),
        status: OrderStatus::from_broker(&order.status),
        filled_quantity: parse_decimal(&order.filled_qty),
        filled_avg_price: order.filled_avg_price.as_deref().and_then(|p| p.parse().ok()),
        created_at,
    })
}

#[async_trait]
impl Broker for AlpacaBroker {
    async fn get_account(&self) -> Result<AccountInfo, BrokerError> {
        let url = format!("{}/v2/account", self.config.base_url());

        let resp = self.client.get(&url).send().await.map_err(|e| self.request_error(e))?;
        let account: AlpacaAccount = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;

        Ok(parse_account(account))
    }

    async fn get_position(&self, symbol: &str) -> Result<Option<BrokerPosition>, BrokerError> {
        let url = format!(
            "{}/v2/positions/{}",
            self.config.base_url(),
            position_path_symbol(symbol)
        );
        let resp = self.client.get(&url).send().await.map_err(|e| self.request_error(e))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let p: AlpacaPosition = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;
        Ok(Some(parse_position(p)))
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<Order, BrokerError> {
        let url = format!("{}/v2/orders", self.config.base_url());

        let create_req = CreateOrderRequest {
            symbol: &request.symbol,
            qty: request.quantity.to_string(),
            side: request.side.as_str(),
            order_type: "market",
            time_in_force: request.time_in_force.as_str(),
        };

        debug!("Submitting order: {:?}", create_req);

        let resp = self
            .client
            .post(&url)
            .json(&create_req)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        if !resp.status().is_success() && resp.status() != StatusCode::TOO_MANY_REQUESTS {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(BrokerError::OrderRejected(format!("{}: {}", status, text)));
        }

        let order: AlpacaOrder = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;

        info!(
            "Order submitted: {} {} {} ({})",
            order.side,
            order.qty.as_deref().unwrap_or("?"),
            order.symbol,
            order.status
        );
        parse_order(order)
    }

    async fn close_position(&self, symbol: &str) -> Result<Order, BrokerError> {
        let url = format!(
            "{}/v2/positions/{}",
            self.config.base_url(),
            position_path_symbol(symbol)
        );
        let resp = self.client.delete(&url).send().await.map_err(|e| self.request_error(e))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(BrokerError::PositionNotFound(symbol.to_string()));
        }

        let order: AlpacaOrder = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;
        info!("Position closed: {}", symbol);
        parse_order(order)
    }

    async fn reset_paper_balance(&self) -> Result<(), BrokerError> {
        // The trading API exposes no balance reset; it is a dashboard-only action
        Err(BrokerError::Unsupported(format!(
            "{} has no paper balance reset endpoint",
            self.name()
        )))
    }

    fn name(&self) -> &str {
        if self.config.paper {
            "Alpaca Paper"
        } else {
            "Alpaca Live"
        }
    }
}
