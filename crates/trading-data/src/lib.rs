//! Market data sources.

mod alpaca;

pub use alpaca::{AlpacaCryptoData, AlpacaDataConfig};

use trading_core::error::DataError;
use trading_core::traits::MarketData;
use trading_core::types::{BarSeries, Timeframe};

/// Fetch up to `limit` bars and require at least `min_bars` after de-duplication.
pub async fn fetch_series(
    source: &dyn MarketData,
    symbol: &str,
    timeframe: Timeframe,
    limit: usize,
    min_bars: usize,
) -> Result<BarSeries, DataError> {
    let bars = source.fetch_bars(symbol, timeframe, limit).await?;
    let series = BarSeries::from_bars(symbol, timeframe, bars);

    if series.len() < min_bars {
        return Err(DataError::InsufficientHistory {
            timeframe,
            required: min_bars,
            available: series.len(),
        });
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use trading_core::types::{Bar, Quote};

    struct StaticBars(Vec<Bar>);

    #[async_trait]
    impl MarketData for StaticBars {
        async fn fetch_bars(&self, _: &str, _: Timeframe, _: usize) -> Result<Vec<Bar>, DataError> {
            Ok(self.0.clone())
        }

        async fn fetch_latest_quote(&self, _: &str) -> Result<Quote, DataError> {
            Ok(Quote::zeroed())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    fn bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| Bar::new(i as i64 * 300_000, 1.0, 2.0, 0.5, 1.5, 1.0))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_series_enforces_minimum() {
        let source = StaticBars(bars(12));
        let err = fetch_series(&source, "BTC/USD", Timeframe::minutes(5), 200, 50)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DataError::InsufficientHistory {
                required: 50,
                available: 12,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_series_dedupes_before_counting() {
        let mut raw = bars(10);
        raw.extend(bars(10));
        let source = StaticBars(raw);

        let series = fetch_series(&source, "BTC/USD", Timeframe::minutes(30), 100, 10)
            .await
            .unwrap();
        assert_eq!(series.len(), 10);

        let source = StaticBars(bars(10));
        assert!(fetch_series(&source, "BTC/USD", Timeframe::minutes(30), 100, 11)
            .await
            .is_err());
    }
}
