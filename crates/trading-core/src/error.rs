//! Error types for the trading controller.

use thiserror::Error;

use crate::types::Timeframe;

/// Strategy-specific errors.
#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Broker-specific errors.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Order rejected: {0}")]
    OrderRejected(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: rust_decimal::Decimal,
        available: rust_decimal::Decimal,
    },

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Operation not supported: {0}")]
    Unsupported(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// Market data errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("No data available for {0}")]
    NoDataAvailable(String),

    #[error("Insufficient {timeframe} history: need {required} bars, have {available}")]
    InsufficientHistory {
        timeframe: Timeframe,
        required: usize,
        available: usize,
    },

    #[error("Quote unavailable for {0}")]
    QuoteUnavailable(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Notification channel errors. These are logged and never propagated into the cycle.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Email delivery failed: {0}")]
    Email(String),

    #[error("Chat delivery failed: {0}")]
    Chat(String),

    #[error("Invalid channel configuration: {0}")]
    Configuration(String),
}
