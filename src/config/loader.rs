//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading scenario
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::BenefitFactorTable;
use crate::provider::ScenarioData;

use super::types::{BrandsConfig, ResourcesConfig, ScenarioMetadata};

/// Loads and validates one scenario directory.
///
/// # Directory Structure
///
/// ```text
/// config/scenarios/base_2025/
/// ├── scenario.yaml         # Scenario metadata
/// ├── benefit_factors.yaml  # Statutory factors and transport subsidy
/// ├── brands.yaml           # Brands and their allocation metrics
/// └── resources.yaml        # Staffing, vehicle, and expense lines
/// ```
///
/// Every record is validated on load, so calculators only ever see
/// well-formed lines.
///
/// # Example
///
/// ```no_run
/// use cost_simulator::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/scenarios/base_2025").unwrap();
/// println!("Loaded scenario: {}", loader.metadata().name);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    scenario: ScenarioData,
}

impl ConfigLoader {
    /// Loads configuration from the specified scenario directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing (`ConfigNotFound`)
    /// - Any file contains invalid YAML (`ConfigParseError`)
    /// - Any record fails validation (`InvalidInput`, `InconsistentScheme`,
    ///   `DedicationMismatch`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let metadata = Self::load_yaml::<ScenarioMetadata>(&path.join("scenario.yaml"))?;
        let benefit_factors =
            Self::load_yaml::<BenefitFactorTable>(&path.join("benefit_factors.yaml"))?;
        let brands = Self::load_yaml::<BrandsConfig>(&path.join("brands.yaml"))?;
        let resources = Self::load_yaml::<ResourcesConfig>(&path.join("resources.yaml"))?;

        let scenario = ScenarioData {
            metadata,
            benefit_factors,
            brands: brands.brands,
            staffing_lines: resources.staffing,
            vehicle_lines: resources.vehicles,
            expense_lines: resources.expenses,
        };
        scenario.validate()?;

        Ok(Self { scenario })
    }

    /// Loads every scenario sub-directory of `root`, ordered by scenario id.
    ///
    /// Sub-directories without a `scenario.yaml` are skipped.
    pub fn load_all<P: AsRef<Path>>(root: P) -> EngineResult<Vec<ScenarioData>> {
        let root = root.as_ref();
        let root_str = root.display().to_string();

        let entries = fs::read_dir(root).map_err(|_| EngineError::ConfigNotFound {
            path: root_str.clone(),
        })?;

        let mut scenarios = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| EngineError::ConfigNotFound {
                path: root_str.clone(),
            })?;
            let path = entry.path();
            if path.is_dir() && path.join("scenario.yaml").exists() {
                scenarios.push(Self::load(&path)?.into_scenario());
            }
        }

        if scenarios.is_empty() {
            return Err(EngineError::ConfigNotFound {
                path: format!("{} (no scenario directories found)", root_str),
            });
        }

        scenarios.sort_by(|a, b| a.metadata.id.cmp(&b.metadata.id));
        Ok(scenarios)
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the scenario metadata.
    pub fn metadata(&self) -> &ScenarioMetadata {
        &self.scenario.metadata
    }

    /// Returns the loaded scenario.
    pub fn scenario(&self) -> &ScenarioData {
        &self.scenario
    }

    /// Consumes the loader, returning the scenario.
    pub fn into_scenario(self) -> ScenarioData {
        self.scenario
    }
}
