//! In-memory scenario snapshot and its boundary validation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::calculation::calculate_line_cost;
use crate::config::ScenarioMetadata;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Assignment, BenefitFactorTable, Brand, BrandUniverse, ExpenseLine, ResourceLine, StaffingLine,
    VehicleLine,
};

/// Every input of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioData {
    /// Scenario identification.
    pub metadata: ScenarioMetadata,
    /// Statutory factor table.
    pub benefit_factors: BenefitFactorTable,
    /// Every brand of the scenario.
    pub brands: Vec<Brand>,
    /// Personnel lines.
    #[serde(default)]
    pub staffing_lines: Vec<StaffingLine>,
    /// Vehicle lines.
    #[serde(default)]
    pub vehicle_lines: Vec<VehicleLine>,
    /// Shared expense lines.
    #[serde(default)]
    pub expense_lines: Vec<ExpenseLine>,
}

impl ScenarioData {
    /// The scenario identifier.
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    /// Iterates every line as a [`ResourceLine`].
    pub fn resource_lines(&self) -> impl Iterator<Item = ResourceLine> + '_ {
        self.staffing_lines
            .iter()
            .cloned()
            .map(ResourceLine::from)
            .chain(self.vehicle_lines.iter().cloned().map(ResourceLine::from))
            .chain(self.expense_lines.iter().cloned().map(ResourceLine::from))
    }

    /// Validates the whole snapshot.
    ///
    /// Checks factor ranges, brand metrics, duplicate brand and line ids,
    /// brand references in assignments, and that every line can be costed
    /// (so scheme mismatches and unknown categories surface at load time).
    pub fn validate(&self) -> EngineResult<()> {
        if self.metadata.id.trim().is_empty() {
            return Err(EngineError::invalid_input("scenario", "scenario id must not be empty"));
        }

        self.benefit_factors.validate()?;
        for brand in &self.brands {
            brand.validate()?;
        }
        let universe = BrandUniverse::new(self.brands.clone())?;

        let mut line_ids = BTreeSet::new();
        for line in self.resource_lines() {
            if !line_ids.insert(line.id().to_string()) {
                return Err(EngineError::invalid_input(line.id(), "duplicate line id"));
            }
            check_brand_references(&line, &universe)?;
            calculate_line_cost(&line, &self.benefit_factors, 0)?;
        }
        Ok(())
    }
}

fn check_brand_references(line: &ResourceLine, universe: &BrandUniverse) -> EngineResult<()> {
    let unknown = |brand_id: &str| {
        EngineError::invalid_input(
            line.id(),
            format!("references unknown brand '{}'", brand_id),
        )
    };

    match line.assignment() {
        Assignment::Individual { brand_id } => {
            if !universe.contains(brand_id) {
                return Err(unknown(brand_id));
            }
        }
        Assignment::Shared(shared) => {
            for brand_id in &shared.eligible_brands {
                if !universe.contains(brand_id) {
                    return Err(unknown(brand_id));
                }
            }
            for brand_id in shared.dedication.iter().flat_map(|d| d.keys()) {
                if !universe.contains(brand_id) {
                    return Err(unknown(brand_id));
                }
            }
        }
    }
    Ok(())
}
