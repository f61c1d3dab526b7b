//! Timeframe definitions for market data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit of a bar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeframeUnit {
    Minute,
    Hour,
    Day,
}

impl TimeframeUnit {
    fn secs(&self) -> u64 {
        match self {
            TimeframeUnit::Minute => 60,
            TimeframeUnit::Hour => 3600,
            TimeframeUnit::Day => 86400,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            TimeframeUnit::Minute => "Min",
            TimeframeUnit::Hour => "Hour",
            TimeframeUnit::Day => "Day",
        }
    }
}

/// Bar interval, e.g. 5 minutes for the entry timeframe and 30 minutes for the
/// higher timeframe.
///
/// Displays in the `5Min` / `1Hour` / `1Day` form used by the market data API and
/// parses both that form and the short `5m` / `1h` / `1d` form used in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timeframe {
    pub amount: u32,
    pub unit: TimeframeUnit,
}

impl Timeframe {
    pub const fn new(amount: u32, unit: TimeframeUnit) -> Self {
        Self { amount, unit }
    }

    pub const fn minutes(amount: u32) -> Self {
        Self::new(amount, TimeframeUnit::Minute)
    }

    pub const fn hours(amount: u32) -> Self {
        Self::new(amount, TimeframeUnit::Hour)
    }

    /// Duration of one bar in seconds.
    pub fn as_secs(&self) -> u64 {
        self.amount as u64 * self.unit.secs()
    }

    /// Duration of one bar in milliseconds.
    pub fn as_millis(&self) -> u64 {
        self.as_secs() * 1000
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::minutes(5)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.label())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("Invalid timeframe: {}", s))?;
        let (digits, unit) = s.split_at(split);

        let amount: u32 = if digits.is_empty() {
            1
        } else {
            digits
                .parse()
                .map_err(|_| format!("Invalid timeframe: {}", s))?
        };
        if amount == 0 {
            return Err(format!("Invalid timeframe: {}", s));
        }

        let unit = match unit.to_lowercase().as_str() {
            "m" | "min" | "minute" | "minutes" => TimeframeUnit::Minute,
            "h" | "hour" | "hours" => TimeframeUnit::Hour,
            "d" | "day" | "days" => TimeframeUnit::Day,
            _ => return Err(format!("Invalid timeframe: {}", s)),
        };

        Ok(Self { amount, unit })
    }
}

impl TryFrom<String> for Timeframe {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        tf.to_string()
    }
}
