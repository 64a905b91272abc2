//! Simulator lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a [`Simulator`](super::Simulator) is in its linear lifecycle.
///
/// ```text
/// INITIALIZED → DATA_LOADED → CALCULATED → AGGREGATED → DONE
///      └────────────┴─────────────┴────────────┴──────→ FAILED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SimulationState {
    /// Brand ids accepted, nothing fetched yet.
    Initialized,
    /// Brands, factors, and lines fetched from the data provider.
    DataLoaded,
    /// Every branch aggregated.
    Calculated,
    /// Per-brand and consolidated results computed.
    Aggregated,
    /// Result handed out.
    Done,
    /// A step failed; the simulator cannot be used further.
    Failed,
}

impl SimulationState {
    /// Returns the state's stable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationState::Initialized => "INITIALIZED",
            SimulationState::DataLoaded => "DATA_LOADED",
            SimulationState::Calculated => "CALCULATED",
            SimulationState::Aggregated => "AGGREGATED",
            SimulationState::Done => "DONE",
            SimulationState::Failed => "FAILED",
        }
    }

    /// Returns true for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SimulationState::Done | SimulationState::Failed)
    }
}

impl fmt::Display for SimulationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
