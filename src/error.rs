//! Error types for the cost simulator.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while loading a scenario,
//! computing line costs, allocating shared costs, and running a simulation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AllocationCriterion, VehicleScheme};
use crate::simulation::SimulationState;

/// Errors raised by an external data source.
///
/// These are wrapped unchanged by [`EngineError::DataProvider`]; the core
/// never retries or swallows them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataProviderError {
    /// The requested scenario does not exist in the data source.
    #[error("Scenario not found: {scenario_id}")]
    ScenarioNotFound {
        /// The scenario identifier that was requested.
        scenario_id: String,
    },

    /// A requested brand does not exist in the scenario.
    #[error("Brand '{brand_id}' not found in scenario '{scenario_id}'")]
    BrandNotFound {
        /// The scenario that was searched.
        scenario_id: String,
        /// The brand identifier that was not found.
        brand_id: String,
    },

    /// The data source could not be reached or returned unusable data.
    #[error("Data source unavailable: {message}")]
    Unavailable {
        /// A description of the failure.
        message: String,
    },
}

/// The main error type for the cost simulator.
///
/// # Example
///
/// ```
/// use cost_simulator::error::EngineError;
///
/// let error = EngineError::ZeroSales {
///     brand_id: "gamma".to_string(),
/// };
/// assert_eq!(error.kind(), "ZERO_SALES");
/// assert_eq!(error.entity(), Some("gamma"));
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A resource line, brand, or factor record is malformed.
    #[error("Invalid input '{entity}': {message}")]
    InvalidInput {
        /// The identifier of the offending record.
        entity: String,
        /// A description of what made the record invalid.
        message: String,
    },

    /// A vehicle line populates a cost component its ownership scheme does not use.
    #[error("Vehicle line '{line_id}' uses scheme '{scheme}' but populates '{field}'")]
    InconsistentScheme {
        /// The offending vehicle line.
        line_id: String,
        /// The line's ownership scheme.
        scheme: VehicleScheme,
        /// The component that is not valid for the scheme.
        field: String,
    },

    /// The allocation basis of every eligible brand sums to zero.
    #[error("Allocation basis for criterion '{criterion}' sums to zero{}", line_suffix(.line_id))]
    DivisionBasisZero {
        /// The criterion whose basis was empty.
        criterion: AllocationCriterion,
        /// The shared line being allocated, when known.
        line_id: Option<String>,
    },

    /// No brand is eligible to receive a share.
    #[error("No eligible brands to allocate to{}", line_suffix(.line_id))]
    NoEligibleBrands {
        /// The shared line being allocated, when known.
        line_id: Option<String>,
    },

    /// Explicit dedication weights are inconsistent.
    #[error("Dedication mismatch{}: {message}", line_suffix(.line_id))]
    DedicationMismatch {
        /// A description of the inconsistency.
        message: String,
        /// The shared line being allocated, when known.
        line_id: Option<String>,
    },

    /// A brand has zero sales, so margin and cost percentage are undefined.
    ///
    /// This is reported as a per-brand warning and never aborts a run.
    #[error("Brand '{brand_id}' has zero sales; margin is undefined")]
    ZeroSales {
        /// The brand with zero sales.
        brand_id: String,
    },

    /// An error propagated unchanged from the data source.
    #[error(transparent)]
    DataProvider(#[from] DataProviderError),

    /// A simulator step was invoked out of order.
    #[error("Simulator is in state {actual}, expected {expected}")]
    InvalidState {
        /// The state the step requires.
        expected: SimulationState,
        /// The state the simulator was in.
        actual: SimulationState,
    },

    /// A general calculation error occurred.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },
}

fn line_suffix(line_id: &Option<String>) -> String {
    match line_id {
        Some(id) => format!(" for line '{}'", id),
        None => String::new(),
    }
}

impl EngineError {
    /// Shorthand for an [`EngineError::InvalidInput`].
    pub fn invalid_input(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            entity: entity.into(),
            message: message.into(),
        }
    }

    /// Returns a stable code identifying the kind of error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            Self::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::InconsistentScheme { .. } => "INCONSISTENT_SCHEME",
            Self::DivisionBasisZero { .. } => "DIVISION_BASIS_ZERO",
            Self::NoEligibleBrands { .. } => "NO_ELIGIBLE_BRANDS",
            Self::DedicationMismatch { .. } => "DEDICATION_MISMATCH",
            Self::ZeroSales { .. } => "ZERO_SALES",
            Self::DataProvider(_) => "DATA_PROVIDER_ERROR",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::CalculationError { .. } => "CALCULATION_ERROR",
        }
    }

    /// Returns the identifier of the offending entity, when there is one.
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::ConfigNotFound { path } | Self::ConfigParseError { path, .. } => Some(path),
            Self::InvalidInput { entity, .. } => Some(entity),
            Self::InconsistentScheme { line_id, .. } => Some(line_id),
            Self::DivisionBasisZero { line_id, .. }
            | Self::NoEligibleBrands { line_id }
            | Self::DedicationMismatch { line_id, .. } => line_id.as_deref(),
            Self::ZeroSales { brand_id } => Some(brand_id),
            Self::DataProvider(DataProviderError::ScenarioNotFound { scenario_id }) => {
                Some(scenario_id)
            }
            Self::DataProvider(DataProviderError::BrandNotFound { brand_id, .. }) => Some(brand_id),
            Self::DataProvider(DataProviderError::Unavailable { .. })
            | Self::InvalidState { .. }
            | Self::CalculationError { .. } => None,
        }
    }

    /// Attaches a shared line identifier to allocator errors raised without one.
    ///
    /// Other variants are returned unchanged.
    pub fn at_line(self, id: &str) -> Self {
        match self {
            Self::DivisionBasisZero {
                criterion,
                line_id: None,
            } => Self::DivisionBasisZero {
                criterion,
                line_id: Some(id.to_string()),
            },
            Self::NoEligibleBrands { line_id: None } => Self::NoEligibleBrands {
                line_id: Some(id.to_string()),
            },
            Self::DedicationMismatch {
                message,
                line_id: None,
            } => Self::DedicationMismatch {
                message,
                line_id: Some(id.to_string()),
            },
            Self::InvalidInput { entity, message } if entity == ALLOCATION_ENTITY => {
                Self::InvalidInput {
                    entity: id.to_string(),
                    message,
                }
            }
            other => other,
        }
    }

    /// Builds the structured, user-facing form of this error.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind().to_string(),
            entity: self.entity().map(str::to_string),
            message: self.to_string(),
        }
    }
}

/// Placeholder entity used by the allocator before a line id is attached.
pub(crate) const ALLOCATION_ENTITY: &str = "allocation";

/// Builds the dedication-sum error message.
pub(crate) fn dedication_sum_message(total: Decimal) -> String {
    format!(
        "dedication weights sum to {}% (expected 100%)",
        (total * Decimal::ONE_HUNDRED).normalize()
    )
}

/// Structured error surfaced to callers: kind plus offending entity.
///
/// # Example
///
/// ```
/// use cost_simulator::error::EngineError;
///
/// let report = EngineError::NoEligibleBrands {
///     line_id: Some("exp_rent".to_string()),
/// }
/// .report();
/// assert_eq!(report.kind, "NO_ELIGIBLE_BRANDS");
/// assert_eq!(report.entity.as_deref(), Some("exp_rent"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable error code.
    pub kind: String,
    /// Identifier of the offending entity, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Human-readable message.
    pub message: String,
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/scenario.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/scenario.yaml"
        );
    }

    #[test]
    fn test_invalid_input_displays_entity_and_message() {
        let error = EngineError::invalid_input("stf_reps", "quantity must be at least 1");
        assert_eq!(
            error.to_string(),
            "Invalid input 'stf_reps': quantity must be at least 1"
        );
        assert_eq!(error.kind(), "INVALID_INPUT");
        assert_eq!(error.entity(), Some("stf_reps"));
    }

    #[test]
    fn test_inconsistent_scheme_displays_scheme_and_field() {
        let error = EngineError::InconsistentScheme {
            line_id: "veh_truck".to_string(),
            scheme: VehicleScheme::ThirdParty,
            field: "fuel".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Vehicle line 'veh_truck' uses scheme 'third_party' but populates 'fuel'"
        );
    }

    #[test]
    fn test_division_basis_zero_without_line() {
        let error = EngineError::DivisionBasisZero {
            criterion: AllocationCriterion::SalesProportional,
            line_id: None,
        };
        assert_eq!(
            error.to_string(),
            "Allocation basis for criterion 'sales_proportional' sums to zero"
        );
        assert_eq!(error.entity(), None);
    }

    #[test]
    fn test_at_line_attaches_line_id() {
        let error = EngineError::DivisionBasisZero {
            criterion: AllocationCriterion::VolumeProportional,
            line_id: None,
        }
        .at_line("exp_warehouse");

        assert_eq!(error.entity(), Some("exp_warehouse"));
        assert!(error.to_string().ends_with("for line 'exp_warehouse'"));
    }

    #[test]
    fn test_at_line_keeps_existing_line_id() {
        let error = EngineError::NoEligibleBrands {
            line_id: Some("first".to_string()),
        }
        .at_line("second");
        assert_eq!(error.entity(), Some("first"));
    }

    #[test]
    fn test_at_line_rewrites_allocation_entity_only() {
        let error = EngineError::invalid_input(ALLOCATION_ENTITY, "negative amount").at_line("x");
        assert_eq!(error.entity(), Some("x"));

        let error = EngineError::invalid_input("stf_1", "bad").at_line("x");
        assert_eq!(error.entity(), Some("stf_1"));
    }

    #[test]
    fn test_data_provider_error_is_transparent() {
        let error: EngineError = DataProviderError::BrandNotFound {
            scenario_id: "base".to_string(),
            brand_id: "ghost".to_string(),
        }
        .into();
        assert_eq!(error.to_string(), "Brand 'ghost' not found in scenario 'base'");
        assert_eq!(error.kind(), "DATA_PROVIDER_ERROR");
        assert_eq!(error.entity(), Some("ghost"));
    }

    #[test]
    fn test_dedication_sum_message_in_percent() {
        let message = dedication_sum_message(Decimal::from_str("0.95").unwrap());
        assert_eq!(message, "dedication weights sum to 95% (expected 100%)");
    }

    #[test]
    fn test_report_serialization_skips_missing_entity() {
        let report = EngineError::CalculationError {
            message: "overflow".to_string(),
        }
        .report();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"kind\":\"CALCULATION_ERROR\""));
        assert!(!json.contains("entity"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
        assert_error::<DataProviderError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn fails() -> Result<(), DataProviderError> {
            Err(DataProviderError::Unavailable {
                message: "timeout".to_string(),
            })
        }

        fn propagates() -> EngineResult<()> {
            fails()?;
            Ok(())
        }

        assert!(matches!(
            propagates(),
            Err(EngineError::DataProvider(DataProviderError::Unavailable { .. }))
        ));
    }
}
