//! Risk management for the trading controller.
//!
//! Provides structural stop/target levels, the daily trade throttle, and the
//! position tracker that decides when to force-close.

mod position_tracker;
mod stop_loss;
mod throttle;

pub use position_tracker::{ExitReason, OpenPosition, PositionTracker};
pub use stop_loss::{is_triggered, risk_distance, StopLossMethod};
pub use throttle::{ThrottleLimits, ThrottleState, TradeThrottle};
