//! In-process paper broker with immediate fills at the live quote.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};
use trading_core::error::BrokerError;
use trading_core::traits::{Broker, MarketData};
use trading_core::types::{AccountInfo, BrokerPosition, Order, OrderRequest, OrderStatus, Side};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct PaperAccount {
    cash: Decimal,
    positions: HashMap<String, BrokerPosition>,
}

impl PaperAccount {
    fn new(cash: Decimal) -> Self {
        Self {
            cash,
            positions: HashMap::new(),
        }
    }

    fn equity(&self) -> Decimal {
        self.cash
            + self
                .positions
                .values()
                .map(|p| p.quantity * p.current_price)
                .sum::<Decimal>()
    }

    /// Apply a fill of `quantity` on `side` at `price`.
    fn apply_fill(&mut self, symbol: &str, side: Side, quantity: Decimal, price: Decimal) {
        let signed = match side {
            Side::Buy => quantity,
            Side::Sell => -quantity,
        };
        self.cash -= signed * price;

        let position = self
            .positions
            .entry(symbol.to_string())
            .or_insert_with(|| BrokerPosition {
                symbol: symbol.to_string(),
                quantity: Decimal::ZERO,
                avg_entry_price: Decimal::ZERO,
                current_price: price,
                unrealized_pnl: Decimal::ZERO,
            });

        let old_qty = position.quantity;
        let new_qty = old_qty + signed;

        if old_qty.is_zero() || (old_qty.is_sign_positive() == signed.is_sign_positive()) {
            // Opening or adding: weighted average entry
            let cost = old_qty.abs() * position.avg_entry_price + quantity * price;
            position.avg_entry_price = cost / new_qty.abs();
        } else if !new_qty.is_zero() && new_qty.is_sign_positive() != old_qty.is_sign_positive() {
            // Flipped through zero: the remainder opens at the fill price
            position.avg_entry_price = price;
        }

        position.quantity = new_qty;
        position.current_price = price;
        position.unrealized_pnl = (price - position.avg_entry_price) * new_qty;

        if new_qty.is_zero() {
            self.positions.remove(symbol);
        }
    }

    fn mark(&mut self, symbol: &str, price: Decimal) {
        if let Some(position) = self.positions.get_mut(symbol) {
            position.current_price = price;
            position.unrealized_pnl = (price - position.avg_entry_price) * position.quantity;
        }
    }
}

/// Simulated broker: market orders fill in full at the current ask (buys) or
/// bid (sells) taken from the quote source.
pub struct PaperBroker {
    account: Arc<Mutex<PaperAccount>>,
    initial_cash: Decimal,
    quotes: Arc<dyn MarketData>,
}

impl PaperBroker {
    /// Create a new paper broker with initial cash.
    pub fn new(initial_cash: Decimal, quotes: Arc<dyn MarketData>) -> Self {
        Self {
            account: Arc::new(Mutex::new(PaperAccount::new(initial_cash))),
            initial_cash,
            quotes,
        }
    }

    /// Mid price for marking open positions; `None` when the quote is unavailable.
    async fn mark_price(&self, symbol: &str) -> Option<Decimal> {
        match self.quotes.fetch_latest_quote(symbol).await {
            Ok(quote) if quote.is_valid() => Decimal::from_f64_retain(quote.mid()),
            Ok(_) => None,
            Err(e) => {
                warn!("Paper broker could not mark {}: {}", symbol, e);
                None
            }
        }
    }

    async fn fill_price(&self, symbol: &str, side: Side) -> Result<Decimal, BrokerError> {
        let quote = self
            .quotes
            .fetch_latest_quote(symbol)
            .await
            .map_err(|e| BrokerError::Connection(e.to_string()))?;

        if !quote.is_valid() {
            return Err(BrokerError::OrderRejected(format!(
                "no valid quote for {}",
                symbol
            )));
        }

        let price = match side {
            Side::Buy => quote.ask,
            Side::Sell => quote.bid,
        };
        Decimal::from_f64_retain(price)
            .ok_or_else(|| BrokerError::OrderRejected(format!("unrepresentable price {}", price)))
    }

    fn filled_order(request: &OrderRequest, price: Decimal) -> Order {
        Order {
            id: Uuid::new_v4().to_string(),
            symbol: request.symbol.clone(),
            side: request.side,
            quantity: request.quantity,
            status: OrderStatus::Filled,
            filled_quantity: request.quantity,
            filled_avg_price: Some(price),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl Broker for PaperBroker {
    async fn get_account(&self) -> Result<AccountInfo, BrokerError> {
        let symbols: Vec<String> = self.account.lock().await.positions.keys().cloned().collect();
        for symbol in symbols {
            if let Some(price) = self.mark_price(&symbol).await {
                self.account.lock().await.mark(&symbol, price);
            }
        }

        let account = self.account.lock().await;
        let cash = account.cash.max(Decimal::ZERO);
        Ok(AccountInfo {
            equity: account.equity(),
            buying_power: cash,
            non_marginable_buying_power: Some(cash),
            crypto_status: Some("ACTIVE".to_string()),
        })
    }

    async fn get_position(&self, symbol: &str) -> Result<Option<BrokerPosition>, BrokerError> {
        if let Some(price) = self.mark_price(symbol).await {
            self.account.lock().await.mark(symbol, price);
        }
        Ok(self.account.lock().await.positions.get(symbol).cloned())
    }

    async fn submit_order(&self, request: OrderRequest) -> Result<Order, BrokerError> {
        if request.quantity <= Decimal::ZERO {
            return Err(BrokerError::OrderRejected(format!(
                "quantity must be positive, got {}",
                request.quantity
            )));
        }

        let price = self.fill_price(&request.symbol, request.side).await?;

        let mut account = self.account.lock().await;
        if request.side == Side::Buy {
            let cost = price * request.quantity;
            let holding_short = account
                .positions
                .get(&request.symbol)
                .map(|p| p.quantity < Decimal::ZERO)
                .unwrap_or(false);
            if !holding_short && cost > account.cash {
                return Err(BrokerError::InsufficientFunds {
                    required: cost,
                    available: account.cash,
                });
            }
        }

        account.apply_fill(&request.symbol, request.side, request.quantity, price);
        let order = Self::filled_order(&request, price);

        info!(
            "Paper fill: {} {} {} @ {}",
            order.side, order.quantity, order.symbol, price
        );
        Ok(order)
    }

    async fn close_position(&self, symbol: &str) -> Result<Order, BrokerError> {
        let (side, quantity) = {
            let account = self.account.lock().await;
            let position = account
                .positions
                .get(symbol)
                .ok_or_else(|| BrokerError::PositionNotFound(symbol.to_string()))?;
            let side = if position.quantity > Decimal::ZERO {
                Side::Sell
            } else {
                Side::Buy
            };
            (side, position.quantity.abs())
        }; // Guard dropped before the quote fetch

        let price = self.fill_price(symbol, side).await?;
        let request = OrderRequest::market(symbol, side, quantity);

        let mut account = self.account.lock().await;
        account.apply_fill(symbol, side, quantity, price);
        info!("Paper position closed: {} @ {}", symbol, price);
        Ok(Self::filled_order(&request, price))
    }

    async fn reset_paper_balance(&self) -> Result<(), BrokerError> {
        let mut account = self.account.lock().await;
        *account = PaperAccount::new(self.initial_cash);
        info!("Paper balance reset to {}", self.initial_cash);
        Ok(())
    }

    fn name(&self) -> &str {
        "Paper Broker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use trading_core::error::DataError;
    use trading_core::types::{Bar, Quote, Timeframe};

    struct FixedQuote(std::sync::Mutex<Quote>);

    impl FixedQuote {
        fn new(bid: f64, ask: f64) -> Arc<Self> {
            Arc::new(Self(std::sync::Mutex::new(Quote::new(bid, ask))))
        }

        fn set(&self, bid: f64, ask: f64) {
            *self.0.lock().unwrap() = Quote::new(bid, ask);
        }
    }

    #[async_trait]
    impl MarketData for FixedQuote {
        async fn fetch_bars(&self, _: &str, _: Timeframe, _: usize) -> Result<Vec<Bar>, DataError> {
            Err(DataError::NoDataAvailable("fixed".into()))
        }

        async fn fetch_latest_quote(&self, _: &str) -> Result<Quote, DataError> {
            Ok(*self.0.lock().unwrap())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_paper_broker_buy_fills_at_ask() {
        let quotes = FixedQuote::new(49_990.0, 50_010.0);
        let broker = PaperBroker::new(dec!(100000), quotes);

        let order = broker
            .submit_order(OrderRequest::market("BTC/USD", Side::Buy, dec!(0.01)))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.filled_avg_price, Some(dec!(50010)));

        let position = broker.get_position("BTC/USD").await.unwrap().unwrap();
        assert_eq!(position.quantity, dec!(0.01));
        assert_eq!(position.avg_entry_price, dec!(50010));

        let account = broker.get_account().await.unwrap();
        assert_eq!(account.buying_power, dec!(100000) - dec!(500.10));
    }

    #[tokio::test]
    async fn test_paper_broker_close_position() {
        let quotes = FixedQuote::new(49_990.0, 50_010.0);
        let broker = PaperBroker::new(dec!(100000), quotes.clone());

        broker
            .submit_order(OrderRequest::market("BTC/USD", Side::Buy, dec!(0.01)))
            .await
            .unwrap();

        quotes.set(51_000.0, 51_020.0);
        let close = broker.close_position("BTC/USD").await.unwrap();
        assert_eq!(close.side, Side::Sell);
        assert_eq!(close.filled_avg_price, Some(dec!(51000)));

        assert!(broker.get_position("BTC/USD").await.unwrap().is_none());
        let account = broker.get_account().await.unwrap();
        assert_eq!(account.equity, dec!(100000) + dec!(9.90));
    }

    #[tokio::test]
    async fn test_short_then_cover() {
        let quotes = FixedQuote::new(50_000.0, 50_020.0);
        let broker = PaperBroker::new(dec!(1000), quotes);

        broker
            .submit_order(OrderRequest::market("BTC/USD", Side::Sell, dec!(0.01)))
            .await
            .unwrap();
        let position = broker.get_position("BTC/USD").await.unwrap().unwrap();
        assert_eq!(position.quantity, dec!(-0.01));

        let close = broker.close_position("BTC/USD").await.unwrap();
        assert_eq!(close.side, Side::Buy);
        assert!(broker.get_position("BTC/USD").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insufficient_funds() {
        let quotes = FixedQuote::new(50_000.0, 50_020.0);
        let broker = PaperBroker::new(dec!(100), quotes);

        let result = broker
            .submit_order(OrderRequest::market("BTC/USD", Side::Buy, dec!(0.01)))
            .await;
        assert!(matches!(result, Err(BrokerError::InsufficientFunds { .. })));
    }

    #[tokio::test]
    async fn test_zero_quote_rejects_order() {
        let quotes = FixedQuote::new(0.0, 0.0);
        let broker = PaperBroker::new(dec!(100000), quotes);

        let result = broker
            .submit_order(OrderRequest::market("BTC/USD", Side::Buy, dec!(0.01)))
            .await;
        assert!(matches!(result, Err(BrokerError::OrderRejected(_))));
    }

    #[tokio::test]
    async fn test_reset_restores_cash_and_clears_positions() {
        let quotes = FixedQuote::new(49_990.0, 50_010.0);
        let broker = PaperBroker::new(dec!(100000), quotes);
        broker
            .submit_order(OrderRequest::market("BTC/USD", Side::Buy, dec!(0.01)))
            .await
            .unwrap();

        broker.reset_paper_balance().await.unwrap();

        assert!(broker.get_position("BTC/USD").await.unwrap().is_none());
        assert_eq!(broker.get_account().await.unwrap().buying_power, dec!(100000));
    }

    #[tokio::test]
    async fn test_close_without_position() {
        let broker = PaperBroker::new(dec!(100000), FixedQuote::new(1.0, 1.0));
        assert!(matches!(
            broker.close_position("BTC/USD").await,
            Err(BrokerError::PositionNotFound(_))
        ));
    }
}
