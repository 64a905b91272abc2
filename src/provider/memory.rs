//! A [`DataProvider`] over scenarios held in memory.

use std::collections::BTreeMap;

use crate::error::{DataProviderError, EngineResult};
use crate::models::{
    Assignment, BenefitFactorTable, Brand, BrandId, ExpenseLine, StaffingLine, VehicleLine,
};

use super::{DataProvider, ProviderResult, ScenarioData};

/// Serves validated [`ScenarioData`] snapshots keyed by scenario id.
///
/// The provider is immutable once built, so it can be shared across threads
/// running independent simulations.
///
/// # Example
///
/// ```no_run
/// use cost_simulator::config::ConfigLoader;
/// use cost_simulator::provider::{DataProvider, InMemoryDataProvider};
///
/// let scenarios = ConfigLoader::load_all("./config/scenarios")?;
/// let provider = InMemoryDataProvider::from_scenarios(scenarios)?;
/// let brands = provider.get_all_brand_ids("base_2025")?;
/// println!("{} brands", brands.len());
/// # Ok::<(), cost_simulator::error::EngineError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataProvider {
    scenarios: BTreeMap<String, ScenarioData>,
}

impl InMemoryDataProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a provider from several scenarios.
    pub fn from_scenarios(scenarios: impl IntoIterator<Item = ScenarioData>) -> EngineResult<Self> {
        let mut provider = Self::new();
        for scenario in scenarios {
            provider.insert(scenario)?;
        }
        Ok(provider)
    }

    /// Validates and adds a scenario, replacing any scenario with the same id.
    pub fn insert(&mut self, scenario: ScenarioData) -> EngineResult<()> {
        scenario.validate()?;
        self.scenarios.insert(scenario.id().to_string(), scenario);
        Ok(())
    }

    /// Looks up a scenario.
    pub fn scenario(&self, scenario_id: &str) -> Option<&ScenarioData> {
        self.scenarios.get(scenario_id)
    }

    /// Ids of every loaded scenario.
    pub fn scenario_ids(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    fn require(&self, scenario_id: &str) -> ProviderResult<&ScenarioData> {
        self.scenarios
            .get(scenario_id)
            .ok_or_else(|| DataProviderError::ScenarioNotFound {
                scenario_id: scenario_id.to_string(),
            })
    }
}

fn serves_any(assignment: &Assignment, brand_ids: &[BrandId]) -> bool {
    brand_ids.iter().any(|id| assignment.serves(id))
}

impl DataProvider for InMemoryDataProvider {
    fn get_brands(&self, scenario_id: &str, ids: &[BrandId]) -> ProviderResult<Vec<Brand>> {
        let scenario = self.require(scenario_id)?;
        ids.iter()
            .map(|id| {
                scenario
                    .brands
                    .iter()
                    .find(|b| &b.id == id)
                    .cloned()
                    .ok_or_else(|| DataProviderError::BrandNotFound {
                        scenario_id: scenario_id.to_string(),
                        brand_id: id.clone(),
                    })
            })
            .collect()
    }

    fn get_all_brand_ids(&self, scenario_id: &str) -> ProviderResult<Vec<BrandId>> {
        let scenario = self.require(scenario_id)?;
        let mut ids: Vec<BrandId> = scenario.brands.iter().map(|b| b.id.clone()).collect();
        ids.sort();
        Ok(ids)
    }

    fn get_benefit_factors(&self, scenario_id: &str) -> ProviderResult<BenefitFactorTable> {
        Ok(self.require(scenario_id)?.benefit_factors.clone())
    }

    fn get_staffing_lines(
        &self,
        scenario_id: &str,
        brand_ids: &[BrandId],
    ) -> ProviderResult<Vec<StaffingLine>> {
        Ok(self
            .require(scenario_id)?
            .staffing_lines
            .iter()
            .filter(|line| serves_any(&line.assignment, brand_ids))
            .cloned()
            .collect())
    }

    fn get_vehicle_lines(
        &self,
        scenario_id: &str,
        brand_ids: &[BrandId],
    ) -> ProviderResult<Vec<VehicleLine>> {
        Ok(self
            .require(scenario_id)?
            .vehicle_lines
            .iter()
            .filter(|line| serves_any(&line.assignment, brand_ids))
            .cloned()
            .collect())
    }

    fn get_shared_expense_lines(&self, scenario_id: &str) -> ProviderResult<Vec<ExpenseLine>> {
        Ok(self
            .require(scenario_id)?
            .expense_lines
            .iter()
            .filter(|line| line.assignment.is_shared())
            .cloned()
            .collect())
    }
}
