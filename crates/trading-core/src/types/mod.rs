//! Core data types for the trading controller.

mod notification;
mod ohlcv;
mod order;
mod position;
mod quote;
mod signal;
mod timeframe;

pub use notification::Notification;
pub use ohlcv::{Bar, BarSeries, RANGE_EPSILON};
pub use order::{Order, OrderRequest, OrderStatus, Side, TimeInForce};
pub use position::{AccountInfo, AccountSnapshot, BrokerPosition, Direction, PositionSide};
pub use quote::Quote;
pub use signal::{RiskLevels, Signal};
pub use timeframe::{Timeframe, TimeframeUnit};
