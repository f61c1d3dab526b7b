//! Broker integrations.
//!
//! [`AlpacaBroker`] talks to the Alpaca trading API (paper or live account).
//! [`PaperBroker`] simulates immediate market fills locally against live quotes.

mod alpaca;
mod paper;

pub use alpaca::{AlpacaBroker, AlpacaConfig};
pub use paper::PaperBroker;
