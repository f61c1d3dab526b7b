//! In-memory collaborators for driver tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trading_core::error::{BrokerError, DataError, NotifyError};
use trading_core::traits::{Broker, MarketData, Notifier};
use trading_core::types::{
    AccountInfo, Bar, BrokerPosition, Notification, Order, OrderRequest, OrderStatus, Quote, Side,
    Timeframe,
};
use trading_risk::ThrottleLimits;
use trading_strategies::SignalConfig;

use crate::EngineConfig;

pub const FIVE_MIN_MS: i64 = 300_000;
pub const THIRTY_MIN_MS: i64 = 1_800_000;

pub fn engine_config() -> EngineConfig {
    EngineConfig {
        symbol: "BTC/USD".into(),
        lot_size: dec!(0.01),
        entry_timeframe: Timeframe::minutes(5),
        higher_timeframe: Timeframe::minutes(30),
        timezone: chrono_tz::UTC,
        entry_bar_limit: 200,
        higher_bar_limit: 100,
        min_entry_bars: 50,
        min_higher_bars: 10,
        poll_interval: Duration::from_millis(5),
        retry_backoff: Duration::from_millis(5),
        buying_power_floor: dec!(500),
        reset_wait: Duration::ZERO,
        signal: SignalConfig::default(),
        throttle: ThrottleLimits::default(),
    }
}

/// 2024-03-01 18:00 UTC
pub fn session_start_ms() -> i64 {
    Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0)
        .unwrap()
        .timestamp_millis()
}

/// Steadily rising 5-minute bar; closes 8 above the open, true range 12.
pub fn rising_bar(index: i64, timestamp: i64) -> Bar {
    let open = 50_000.0 + 10.0 * index as f64;
    let close = open + 8.0;
    Bar::new(timestamp, open, close + 2.0, open - 2.0, close, 1.0)
}

/// Sixty rising bars from 18:00 to 22:55: fast EMA over slow, close over VWAP,
/// last close 50,598.
pub fn entry_bars() -> Vec<Bar> {
    let start = session_start_ms();
    (0..60)
        .map(|i| rising_bar(i, start + i * FIVE_MIN_MS))
        .collect()
}

/// Twelve bullish 30-minute bars; the prior bar's low is 50,490.
pub fn higher_bars() -> Vec<Bar> {
    let start = session_start_ms() - 12 * THIRTY_MIN_MS;
    (0..12)
        .map(|j| {
            let open = 50_000.0 + 50.0 * j as f64;
            let close = open + 40.0;
            Bar::new(start + j * THIRTY_MIN_MS, open, close + 10.0, open - 10.0, close, 40.0)
        })
        .collect()
}

struct FeedState {
    entry: Vec<Bar>,
    higher: Vec<Bar>,
    quote: Quote,
    fail_bars: bool,
    fail_quote: bool,
}

/// Market data returning whatever the test scripted.
pub struct ScriptedFeed {
    entry_timeframe: Timeframe,
    state: Mutex<FeedState>,
}

impl ScriptedFeed {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            entry_timeframe: Timeframe::minutes(5),
            state: Mutex::new(FeedState {
                entry: entry_bars(),
                higher: higher_bars(),
                quote: Quote::new(50_590.0, 50_600.0),
                fail_bars: false,
                fail_quote: false,
            }),
        })
    }

    pub fn set_quote(&self, bid: f64, ask: f64) {
        self.state.lock().unwrap().quote = Quote::new(bid, ask);
    }

    pub fn fail_quote(&self, fail: bool) {
        self.state.lock().unwrap().fail_quote = fail;
    }

    pub fn fail_bars(&self, fail: bool) {
        self.state.lock().unwrap().fail_bars = fail;
    }

    pub fn set_higher(&self, bars: Vec<Bar>) {
        self.state.lock().unwrap().higher = bars;
    }

    /// Append the next rising entry bar at `timestamp`.
    pub fn push_entry_bar(&self, timestamp: i64) {
        let mut state = self.state.lock().unwrap();
        let index = state.entry.len() as i64;
        state.entry.push(rising_bar(index, timestamp));
    }

    /// Drop the newest entry bar, as an incomplete response would.
    pub fn pop_entry_bar(&self) -> Option<Bar> {
        self.state.lock().unwrap().entry.pop()
    }

    pub fn last_entry_timestamp(&self) -> i64 {
        self.state.lock().unwrap().entry.last().unwrap().timestamp
    }
}

#[async_trait]
impl MarketData for ScriptedFeed {
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        _limit: usize,
    ) -> Result<Vec<Bar>, DataError> {
        let state = self.state.lock().unwrap();
        if state.fail_bars {
            return Err(DataError::ConnectionError("feed offline".into()));
        }
        let bars = if timeframe == self.entry_timeframe {
            state.entry.clone()
        } else {
            state.higher.clone()
        };
        if bars.is_empty() {
            return Err(DataError::NoDataAvailable(symbol.to_string()));
        }
        Ok(bars)
    }

    async fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote, DataError> {
        let state = self.state.lock().unwrap();
        if state.fail_quote {
            return Err(DataError::QuoteUnavailable(symbol.to_string()));
        }
        Ok(state.quote)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
pub struct BrokerLog {
    pub account: AccountInfo,
    pub position: Option<BrokerPosition>,
    pub submitted: Vec<OrderRequest>,
    pub closes: usize,
    pub resets: usize,
    pub reject_orders: bool,
    pub fail_close: bool,
    pub fail_position_query: bool,
    pub reset_unsupported: bool,
    /// Accept orders without reporting the position yet
    pub late_fill: bool,
}

/// Broker that fills every accepted order at a fixed average price.
pub struct MockBroker {
    pub log: Mutex<BrokerLog>,
}

impl MockBroker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            log: Mutex::new(BrokerLog {
                account: AccountInfo {
                    equity: dec!(100000),
                    buying_power: dec!(100000),
                    non_marginable_buying_power: None,
                    crypto_status: Some("ACTIVE".into()),
                },
                ..Default::default()
            }),
        })
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut BrokerLog) -> R) -> R {
        f(&mut self.log.lock().unwrap())
    }
}

fn ack(request: &OrderRequest) -> Order {
    Order {
        id: format!("mock-{}", request.side.as_str()),
        symbol: request.symbol.clone(),
        side: request.side,
        quantity: request.quantity,
        status: OrderStatus::from_broker("accepted"),
        filled_quantity: Decimal::ZERO,
        filled_avg_price: None,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl Broker for MockBroker {
    async fn get_account(&self) -> Result<AccountInfo, BrokerError> {
        Ok(self.log.lock().unwrap().account.clone())
    }

    async fn get_position(&self, _symbol: &str) -> Result<Option<BrokerPosition>, BrokerError> {
        let log = self.log.lock().unwrap();
        if log.fail_position_query {
            return Err(BrokerError::Connection("positions endpoint down".into()));
        }
        Ok(log.position.clone())
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<Order, BrokerError> {
        let mut log = self.log.lock().unwrap();
        if log.reject_orders {
            return Err(BrokerError::OrderRejected("403: insufficient balance".into()));
        }
        let signed = match request.side {
            Side::Buy => request.quantity,
            Side::Sell => -request.quantity,
        };
        let position = Some(BrokerPosition {
            symbol: request.symbol.clone(),
            quantity: signed,
            avg_entry_price: dec!(50600),
            current_price: dec!(50600),
            unrealized_pnl: Decimal::ZERO,
        });
        if !log.late_fill {
            log.position = position;
        }
        let order = ack(&request);
        log.submitted.push(request);
        Ok(order)
    }

    async fn close_position(&self, symbol: &str) -> Result<Order, BrokerError> {
        let mut log = self.log.lock().unwrap();
        log.closes += 1;
        if log.fail_close {
            return Err(BrokerError::ApiError("500: internal error".into()));
        }
        let position = log
            .position
            .take()
            .ok_or_else(|| BrokerError::PositionNotFound(symbol.to_string()))?;
        let side = if position.quantity > Decimal::ZERO {
            Side::Sell
        } else {
            Side::Buy
        };
        Ok(ack(&OrderRequest::market(symbol, side, position.quantity.abs())))
    }

    async fn reset_paper_balance(&self) -> Result<(), BrokerError> {
        let mut log = self.log.lock().unwrap();
        log.resets += 1;
        if log.reset_unsupported {
            return Err(BrokerError::Unsupported("reset".into()));
        }
        log.account.buying_power = dec!(100000);
        log.account.equity = dec!(100000);
        log.account.non_marginable_buying_power = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Notifier remembering every subject it was handed.
#[derive(Default)]
pub struct Recorder {
    pub subjects: Mutex<Vec<String>>,
}

impl Recorder {
    /// Wait briefly for detached deliveries to land.
    pub async fn wait_for(&self, count: usize) -> Vec<String> {
        for _ in 0..100 {
            if self.subjects.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.subjects.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for Recorder {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.subjects
            .lock()
            .unwrap()
            .push(notification.subject.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recorder"
    }
}
