//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::Timeframe;

/// Guard added to a bar's range before dividing by it.
pub const RANGE_EPSILON: f64 = 1e-8;

/// Compact OHLCV bar. Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time, Unix milliseconds (UTC)
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Calculate the typical price (HLC average).
    #[inline]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Calculate the bar's range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Calculate the bar's body size (absolute difference between open and close).
    #[inline]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Body as a fraction of the full range. A zero-range bar yields 0 rather than NaN.
    #[inline]
    pub fn body_fraction(&self) -> f64 {
        self.body() / (self.range() + RANGE_EPSILON)
    }

    /// Check if the bar is bullish (close > open).
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Check if the bar is bearish (close < open).
    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Get the timestamp as a DateTime.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_default()
    }

    /// Calendar date of the bar in the given session timezone.
    pub fn local_date(&self, tz: Tz) -> NaiveDate {
        self.datetime().with_timezone(&tz).date_naive()
    }

    /// Calculate the true range. Without a prior close this is the bar's own range.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        match prev_close {
            Some(pc) => {
                let hl = self.high - self.low;
                let hc = (self.high - pc).abs();
                let lc = (self.low - pc).abs();
                hl.max(hc).max(lc)
            }
            None => self.high - self.low,
        }
    }
}

/// Ordered bars for one symbol and timeframe, oldest first.
#[derive(Debug, Clone)]
pub struct BarSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series from fetched bars, sorting by timestamp and dropping
    /// duplicate timestamps so the series is strictly increasing.
    pub fn from_bars(symbol: impl Into<String>, timeframe: Timeframe, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// The most recent bar.
    pub fn current(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// The bar before the most recent one.
    pub fn prior(&self) -> Option<&Bar> {
        self.bars.len().checked_sub(2).and_then(|i| self.bars.get(i))
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_calculations() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);

        assert!((bar.typical_price() - 103.333333).abs() < 0.001);
        assert!((bar.range() - 15.0).abs() < 0.001);
        assert!((bar.body() - 5.0).abs() < 0.001);
        assert!((bar.body_fraction() - 5.0 / 15.0).abs() < 1e-6);
        assert!(bar.is_bullish());
        assert!(!bar.is_bearish());
    }

    #[test]
    fn test_flat_bar_body_fraction_is_finite() {
        let bar = Bar::new(0, 100.0, 100.0, 100.0, 100.0, 1.0);
        assert_eq!(bar.body_fraction(), 0.0);
        assert!(!bar.is_bullish() && !bar.is_bearish());
    }

    #[test]
    fn test_bar_true_range() {
        let bar = Bar::new(1000, 100.0, 110.0, 95.0, 105.0, 1000000.0);

        assert!((bar.true_range(None) - 15.0).abs() < 0.001);
        // Gap below the prior close widens the range
        assert!((bar.true_range(Some(90.0)) - 20.0).abs() < 0.001);
    }

    #[test]
    fn test_local_date_uses_session_timezone() {
        // 2024-03-01 22:30 UTC is already 2024-03-02 in Moscow (UTC+3)
        let ts = DateTime::parse_from_rfc3339("2024-03-01T22:30:00Z")
            .unwrap()
            .timestamp_millis();
        let bar = Bar::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0);

        assert_eq!(
            bar.local_date(chrono_tz::Europe::Moscow),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
        assert_eq!(
            bar.local_date(chrono_tz::UTC),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_series_current_and_prior() {
        let series = BarSeries::from_bars(
            "BTC/USD",
            Timeframe::minutes(5),
            vec![
                Bar::new(3, 102.0, 103.0, 101.0, 102.5, 30.0),
                Bar::new(1, 100.0, 101.0, 99.0, 100.5, 10.0),
                Bar::new(2, 100.5, 102.0, 100.0, 101.5, 20.0),
                Bar::new(2, 0.0, 0.0, 0.0, 0.0, 0.0),
            ],
        );

        assert_eq!(series.len(), 3);
        assert_eq!(series.current().unwrap().timestamp, 3);
        assert_eq!(series.prior().unwrap().timestamp, 2);
        assert_eq!(series.closes(), vec![100.5, 101.5, 102.5]);
    }
}
