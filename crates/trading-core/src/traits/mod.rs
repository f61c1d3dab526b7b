//! Core traits for the trading controller.

mod broker;
mod indicator;
mod market_data;
mod notifier;
mod strategy;

pub use broker::Broker;
pub use indicator::{BarIndicator, Indicator};
pub use market_data::MarketData;
pub use notifier::Notifier;
pub use strategy::StrategyConfig;
