//! Cycle driver for the single-instrument trading controller.
//!
//! [`CycleDriver`] owns the [`EngineState`] (throttle, position tracker, last
//! processed bar, account snapshot) and is its only writer. One cycle runs to
//! completion before the next starts.

mod config;
mod driver;
mod state;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use driver::{CycleDriver, CycleOutcome, EntryOutcome, ExitOutcome, SkipReason};
pub use state::EngineState;
