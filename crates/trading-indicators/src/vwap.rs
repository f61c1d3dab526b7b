//! Session-anchored volume-weighted average price.

use chrono::NaiveDate;
use chrono_tz::Tz;
use trading_core::traits::BarIndicator;
use trading_core::types::{Bar, RANGE_EPSILON};

/// VWAP that resets at each calendar-day boundary of the session timezone.
///
/// Uses the typical price `(h + l + c) / 3`. If a session has traded no volume
/// yet, the value falls back to the bar's typical price instead of dividing by zero.
#[derive(Debug, Clone)]
pub struct SessionVwap {
    tz: Tz,
}

impl SessionVwap {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl BarIndicator for SessionVwap {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = Vec::with_capacity(bars.len());
        let mut session: Option<NaiveDate> = None;
        let mut cum_pv = 0.0;
        let mut cum_vol = 0.0;

        for bar in bars {
            let day = bar.local_date(self.tz);
            if session != Some(day) {
                session = Some(day);
                cum_pv = 0.0;
                cum_vol = 0.0;
            }

            let tp = bar.typical_price();
            cum_pv += tp * bar.volume;
            cum_vol += bar.volume;

            if cum_vol > RANGE_EPSILON {
                result.push(cum_pv / cum_vol);
            } else {
                result.push(tp);
            }
        }

        result
    }

    fn name(&self) -> &str {
        "SessionVWAP"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn ts(s: &str) -> i64 {
        DateTime::parse_from_rfc3339(s).unwrap().timestamp_millis()
    }

    #[test]
    fn test_cumulative_within_session() {
        let bars = vec![
            Bar::new(ts("2024-05-01T10:00:00Z"), 0.0, 12.0, 8.0, 10.0, 1.0),
            Bar::new(ts("2024-05-01T10:05:00Z"), 0.0, 22.0, 18.0, 20.0, 3.0),
        ];

        let vwap = SessionVwap::new(chrono_tz::UTC).calculate(&bars);
        assert!((vwap[0] - 10.0).abs() < 1e-10);
        assert!((vwap[1] - 17.5).abs() < 1e-10); // (10*1 + 20*3) / 4
    }

    #[test]
    fn test_resets_at_day_boundary() {
        // Same price and volume on two different days: the second day's VWAP must
        // only reflect its own bars.
        let bars = vec![
            Bar::new(ts("2024-05-01T23:50:00Z"), 0.0, 101.0, 99.0, 100.0, 5.0),
            Bar::new(ts("2024-05-01T23:55:00Z"), 0.0, 201.0, 199.0, 200.0, 5.0),
            Bar::new(ts("2024-05-02T00:00:00Z"), 0.0, 101.0, 99.0, 100.0, 5.0),
        ];

        let vwap = SessionVwap::new(chrono_tz::UTC).calculate(&bars);
        assert!((vwap[1] - 150.0).abs() < 1e-10);
        assert!((vwap[2] - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_boundary_follows_session_timezone() {
        // 20:55 and 21:00 UTC straddle midnight in Moscow (UTC+3)
        let bars = vec![
            Bar::new(ts("2024-05-01T20:55:00Z"), 0.0, 101.0, 99.0, 100.0, 5.0),
            Bar::new(ts("2024-05-01T21:00:00Z"), 0.0, 201.0, 199.0, 200.0, 5.0),
        ];

        let moscow = SessionVwap::new(chrono_tz::Europe::Moscow).calculate(&bars);
        assert!((moscow[1] - 200.0).abs() < 1e-10);

        let utc = SessionVwap::new(chrono_tz::UTC).calculate(&bars);
        assert!((utc[1] - 150.0).abs() < 1e-10);
    }

    #[test]
    fn test_zero_volume_session_is_finite() {
        let bars = vec![Bar::new(ts("2024-05-01T10:00:00Z"), 0.0, 12.0, 8.0, 10.0, 0.0)];

        let vwap = SessionVwap::new(chrono_tz::UTC).calculate(&bars);
        assert!(vwap[0].is_finite());
        assert!((vwap[0] - 10.0).abs() < 1e-10);
    }
}
