//! Simulation orchestration.
//!
//! A [`Simulator`] drives one run through its lifecycle: fetch a data
//! snapshot, aggregate each branch, compute per-brand margins, and hand out
//! the [`SimulationResult`](crate::models::SimulationResult).
//! [`run_simulation`] wraps the whole lifecycle in a single call.

mod simulator;
mod state;

pub use simulator::{BRAND_MARGIN_RULE_ID, Simulator, run_simulation};
pub use state::SimulationState;
