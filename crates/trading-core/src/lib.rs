//! Core types and traits for the trading controller.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, BarSeries, Quote, Timeframe)
//! - Order, position and account snapshot types
//! - The tagged entry `Signal`
//! - Collaborator traits for the broker, the market data feed and notification channels

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
