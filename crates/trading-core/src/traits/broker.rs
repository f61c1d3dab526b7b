//! Broker trait definition.

use crate::error::BrokerError;
use crate::types::{AccountInfo, BrokerPosition, Order, OrderRequest};
use async_trait::async_trait;

/// Trait for brokerage integrations.
///
/// The controller only needs account figures, the position for its one symbol,
/// market order submission and a full close.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Get account equity and buying power.
    async fn get_account(&self) -> Result<AccountInfo, BrokerError>;

    /// Get the position for a specific symbol.
    ///
    /// # Returns
    /// The position if one exists, None otherwise
    async fn get_position(&self, symbol: &str) -> Result<Option<BrokerPosition>, BrokerError>;

    /// Submit a market order.
    ///
    /// # Returns
    /// The broker's acknowledgement with its order ID
    async fn submit_order(&self, request: OrderRequest) -> Result<Order, BrokerError>;

    /// Close the entire position in `symbol` at market.
    async fn close_position(&self, symbol: &str) -> Result<Order, BrokerError>;

    /// Restore a paper account to its starting balance.
    async fn reset_paper_balance(&self) -> Result<(), BrokerError>;

    /// Get the broker name.
    fn name(&self) -> &str;
}
