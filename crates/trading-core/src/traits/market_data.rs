//! Market data trait definition.

use crate::error::DataError;
use crate::types::{Bar, Quote, Timeframe};
use async_trait::async_trait;

/// Source of recent bars and the current quote for a symbol.
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Fetch up to `limit` of the most recent bars.
    ///
    /// # Returns
    /// Bars ordered from oldest to newest. An empty response is an error.
    async fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Bar>, DataError>;

    /// Fetch the latest bid/ask.
    async fn fetch_latest_quote(&self, symbol: &str) -> Result<Quote, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}
