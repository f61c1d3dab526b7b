//! Alpaca crypto market data (v1beta3).

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat, Utc};
use reqwest::{header, Client, Response};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use trading_core::error::DataError;
use trading_core::traits::MarketData;
use trading_core::types::{Bar, Quote, Timeframe};

const DATA_URL: &str = "https://data.alpaca.markets";

/// Crypto data endpoint configuration. Credentials are optional for crypto
/// data but raise the rate limit when present.
#[derive(Debug, Clone)]
pub struct AlpacaDataConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub data_url: String,
    /// Crypto venue location segment (`us`)
    pub location: String,
    pub timeout_secs: u64,
}

impl Default for AlpacaDataConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_secret: None,
            data_url: DATA_URL.to_string(),
            location: "us".to_string(),
            timeout_secs: 10,
        }
    }
}

impl AlpacaDataConfig {
    pub fn with_credentials(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self.api_secret = Some(secret.into());
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/v1beta3/crypto/{}/{}",
            self.data_url.trim_end_matches('/'),
            self.location,
            path
        )
    }
}

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    t: String,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    v: f64,
}

#[derive(Debug, Deserialize)]
struct AlpacaBarsResponse {
    #[serde(default)]
    bars: HashMap<String, Vec<AlpacaBar>>,
}

#[derive(Debug, Deserialize)]
struct AlpacaQuote {
    ap: f64,
    bp: f64,
}

#[derive(Debug, Deserialize)]
struct AlpacaLatestQuotesResponse {
    #[serde(default)]
    quotes: HashMap<String, AlpacaQuote>,
}

/// Market data client for Alpaca crypto bars and quotes.
pub struct AlpacaCryptoData {
    config: AlpacaDataConfig,
    client: Client,
}

impl AlpacaCryptoData {
    pub fn new(config: AlpacaDataConfig) -> Result<Self, DataError> {
        let mut headers = header::HeaderMap::new();
        if let (Some(key), Some(secret)) = (&config.api_key, &config.api_secret) {
            headers.insert(
                "APCA-API-KEY-ID",
                header::HeaderValue::from_str(key)
                    .map_err(|e| DataError::ConnectionError(e.to_string()))?,
            );
            headers.insert(
                "APCA-API-SECRET-KEY",
                header::HeaderValue::from_str(secret)
                    .map_err(|e| DataError::ConnectionError(e.to_string()))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn request_error(&self, e: reqwest::Error) -> DataError {
        if e.is_timeout() {
            DataError::Timeout(self.config.timeout_secs)
        } else {
            DataError::ConnectionError(e.to_string())
        }
    }

    async fn check(resp: Response) -> Result<Response, DataError> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(DataError::ConnectionError(format!("{}: {}", status, text)))
    }
}

/// Window start that covers `limit` bars with slack for gaps.
fn lookback_start(now: DateTime<Utc>, timeframe: Timeframe, limit: usize) -> DateTime<Utc> {
    let secs = timeframe.as_secs() as i64 * (limit as i64) * 2;
    now - ChronoDuration::seconds(secs)
}

fn parse_bars(mut response: AlpacaBarsResponse, symbol: &str, limit: usize) -> Result<Vec<Bar>, DataError> {
    let raw = response
        .bars
        .remove(symbol)
        .ok_or_else(|| DataError::NoDataAvailable(symbol.to_string()))?;

    let mut bars = raw
        .into_iter()
        .map(|b| {
            let ts = DateTime::parse_from_rfc3339(&b.t)
                .map(|dt| dt.timestamp_millis())
                .map_err(|e| DataError::ParseError(format!("bar timestamp {}: {}", b.t, e)))?;
            Ok(Bar::new(ts, b.o, b.h, b.l, b.c, b.v))
        })
        .collect::<Result<Vec<_>, DataError>>()?;

    // Requested newest-first; keep the most recent `limit`, oldest first
    bars.sort_by_key(|b| b.timestamp);
    if bars.len() > limit {
        bars.drain(..bars.len() - limit);
    }

    if bars.is_empty() {
        return Err(DataError::NoDataAvailable(symbol.to_string()));
    }
    Ok(bars)
}

#[async_trait]
impl MarketData for AlpacaCryptoData {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, DataError> {
        let url = self.config.endpoint("bars");
        let start = lookback_start(Utc::now(), timeframe, limit)
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let params = [
            ("symbols", symbol.to_string()),
            ("timeframe", timeframe.to_string()),
            ("start", start),
            ("limit", limit.to_string()),
            ("sort", "desc".to_string()),
        ];

        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let data: AlpacaBarsResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let bars = parse_bars(data, symbol, limit)?;
        debug!(symbol, %timeframe, count = bars.len(), "Fetched bars");
        Ok(bars)
    }

    async fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        let url = self.config.endpoint("latest/quotes");

        let resp = self
            .client
            .get(&url)
            .query(&[("symbols", symbol)])
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let mut data: AlpacaLatestQuotesResponse = Self::check(resp)
            .await?
            .json()
            .await
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let quote = data
            .quotes
            .remove(symbol)
            .ok_or_else(|| DataError::QuoteUnavailable(symbol.to_string()))?;

        Ok(Quote::new(quote.bp, quote.ap))
    }

    fn name(&self) -> &str {
        "Alpaca Crypto"
    }
}
