//! Configuration types for scenario files.
//!
//! These are the strongly-typed structures deserialized from the YAML files
//! of a scenario directory.

use serde::{Deserialize, Serialize};

use crate::models::{Brand, ExpenseLine, StaffingLine, VehicleLine};

/// Metadata about a scenario.
///
/// Identifies one named, versioned snapshot of simulation inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMetadata {
    /// The scenario identifier (e.g., "base_2025").
    pub id: String,
    /// The human-readable name of the scenario.
    pub name: String,
    /// The fiscal year the statutory factors belong to.
    pub year: i32,
    /// ISO currency code of every amount in the scenario.
    pub currency: String,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Brands file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandsConfig {
    /// Every brand of the scenario.
    pub brands: Vec<Brand>,
}

/// Resources file structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourcesConfig {
    /// Personnel lines.
    #[serde(default)]
    pub staffing: Vec<StaffingLine>,
    /// Vehicle lines.
    #[serde(default)]
    pub vehicles: Vec<VehicleLine>,
    /// Shared expense lines.
    #[serde(default)]
    pub expenses: Vec<ExpenseLine>,
}
