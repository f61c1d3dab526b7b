//! Operator-facing output: logging, trade notifications, the liveness
//! endpoint and the per-bar status report.

mod events;
mod health;
mod logging;
mod notify;
mod report;

pub use events::{price, TradeEvent};
pub use health::{liveness_text, router, spawn_health_server, HealthState};
pub use logging::setup_logging;
pub use notify::{ChatNotifier, EmailNotifier, NotificationHub};
pub use report::StatusReport;
