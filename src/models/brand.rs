//! Brand model and the per-run brand universe.
//!
//! A [`Brand`] carries the metrics used as allocation bases. The
//! [`BrandUniverse`] is the run's read-only snapshot of every brand that can
//! receive a share of a shared cost, including brands outside the requested
//! simulation subset.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::{
    AllocationCriterion, FLAT_CONSOLIDATED_KEY, FLAT_SHARED_ALLOCATIONS_KEY, SharedAssignment,
};

/// Identifier of a brand.
pub type BrandId = String;

/// Metrics used as allocation bases for a brand.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BrandMetrics {
    /// Monthly sales.
    pub sales: Decimal,
    /// Monthly operational volume (boxes, cases, drops).
    #[serde(default)]
    pub volume: Decimal,
    /// Headcount attributable to the brand.
    #[serde(default)]
    pub headcount: u32,
    /// Measured usage units (hours, trips, square metres).
    #[serde(default)]
    pub usage_units: Decimal,
}

impl BrandMetrics {
    /// Returns the basis value for a proportional criterion.
    ///
    /// Returns `None` for [`AllocationCriterion::EqualSplit`], which has no basis.
    pub fn basis(&self, criterion: AllocationCriterion) -> Option<Decimal> {
        match criterion {
            AllocationCriterion::SalesProportional => Some(self.sales),
            AllocationCriterion::VolumeProportional => Some(self.volume),
            AllocationCriterion::HeadcountProportional => Some(Decimal::from(self.headcount)),
            AllocationCriterion::MeasuredUsage => Some(self.usage_units),
            AllocationCriterion::EqualSplit => None,
        }
    }
}

/// A distribution brand sharing the agent's operational resources.
///
/// # Example
///
/// ```
/// use cost_simulator::models::{Brand, BrandMetrics};
/// use rust_decimal::Decimal;
///
/// let brand = Brand {
///     id: "alpha".to_string(),
///     name: "Alpha Foods".to_string(),
///     active: true,
///     metrics: BrandMetrics {
///         sales: Decimal::from(150_000_000),
///         ..BrandMetrics::default()
///     },
/// };
/// assert!(brand.active);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Unique identifier.
    pub id: BrandId,
    /// Display name.
    pub name: String,
    /// Inactive brands never receive shared costs.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Allocation-basis metrics for this run.
    pub metrics: BrandMetrics,
}

fn default_active() -> bool {
    true
}

impl Brand {
    /// Validates the id and that no metric is negative.
    ///
    /// Ids that collide with the flat result's top-level keys are rejected.
    pub fn validate(&self) -> EngineResult<()> {
        if self.id.trim().is_empty() {
            return Err(EngineError::invalid_input(
                &self.name,
                "brand id must not be empty",
            ));
        }
        if self.id == FLAT_CONSOLIDATED_KEY || self.id == FLAT_SHARED_ALLOCATIONS_KEY {
            return Err(EngineError::invalid_input(
                &self.id,
                "brand id is reserved in the flat result",
            ));
        }
        let metrics = [
            ("sales", self.metrics.sales),
            ("volume", self.metrics.volume),
            ("usage_units", self.metrics.usage_units),
        ];
        for (name, value) in metrics {
            if value < Decimal::ZERO {
                return Err(EngineError::invalid_input(
                    &self.id,
                    format!("metric '{}' must not be negative, got {}", name, value),
                ));
            }
        }
        Ok(())
    }
}

/// Read-only snapshot of all brands known to a simulation run, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandUniverse {
    brands: BTreeMap<BrandId, Brand>,
}

impl BrandUniverse {
    /// Builds a universe, rejecting duplicate brand ids.
    pub fn new(brands: Vec<Brand>) -> EngineResult<Self> {
        let mut map = BTreeMap::new();
        for brand in brands {
            if map.contains_key(&brand.id) {
                return Err(EngineError::invalid_input(
                    &brand.id,
                    "duplicate brand id in universe",
                ));
            }
            map.insert(brand.id.clone(), brand);
        }
        Ok(Self { brands: map })
    }

    /// Looks up a brand by id.
    pub fn get(&self, id: &str) -> Option<&Brand> {
        self.brands.get(id)
    }

    /// Returns true if the universe contains the brand.
    pub fn contains(&self, id: &str) -> bool {
        self.brands.contains_key(id)
    }

    /// Iterates brands in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Brand> {
        self.brands.values()
    }

    /// Number of brands in the universe.
    pub fn len(&self) -> usize {
        self.brands.len()
    }

    /// Returns true if the universe has no brands.
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    /// Resolves the brands eligible to receive a share of a shared line.
    ///
    /// An empty `eligible_brands` list selects every active brand. Inactive
    /// brands are dropped; an id missing from the universe is an error.
    /// The result is ordered by brand id.
    pub fn eligible_for(&self, line_id: &str, assignment: &SharedAssignment) -> EngineResult<Vec<Brand>> {
        if assignment.eligible_brands.is_empty() {
            return Ok(self.brands.values().filter(|b| b.active).cloned().collect());
        }

        let mut eligible: BTreeMap<&str, &Brand> = BTreeMap::new();
        for id in &assignment.eligible_brands {
            let brand = self.brands.get(id).ok_or_else(|| {
                EngineError::invalid_input(
                    line_id,
                    format!("eligible brand '{}' is not part of the scenario", id),
                )
            })?;
            if brand.active {
                eligible.insert(brand.id.as_str(), brand);
            }
        }
        Ok(eligible.into_values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brand(id: &str, sales: i64, active: bool) -> Brand {
        Brand {
            id: id.to_string(),
            name: id.to_uppercase(),
            active,
            metrics: BrandMetrics {
                sales: Decimal::from(sales),
                volume: Decimal::from(10),
                headcount: 3,
                usage_units: Decimal::from(7),
            },
        }
    }

    fn shared(eligible: &[&str]) -> SharedAssignment {
        SharedAssignment {
            criterion: AllocationCriterion::SalesProportional,
            eligible_brands: eligible.iter().map(|s| s.to_string()).collect(),
            dedication: None,
        }
    }

    #[test]
    fn test_basis_per_criterion() {
        let metrics = brand("a", 100, true).metrics;
        assert_eq!(
            metrics.basis(AllocationCriterion::SalesProportional),
            Some(Decimal::from(100))
        );
        assert_eq!(
            metrics.basis(AllocationCriterion::VolumeProportional),
            Some(Decimal::from(10))
        );
        assert_eq!(
            metrics.basis(AllocationCriterion::HeadcountProportional),
            Some(Decimal::from(3))
        );
        assert_eq!(
            metrics.basis(AllocationCriterion::MeasuredUsage),
            Some(Decimal::from(7))
        );
        assert_eq!(metrics.basis(AllocationCriterion::EqualSplit), None);
    }

    #[test]
    fn test_deserialize_brand_defaults() {
        let json = r#"{
            "id": "alpha",
            "name": "Alpha",
            "metrics": { "sales": "150000000" }
        }"#;
        let brand: Brand = serde_json::from_str(json).unwrap();
        assert!(brand.active);
        assert_eq!(brand.metrics.sales, Decimal::from(150_000_000));
        assert_eq!(brand.metrics.headcount, 0);
    }

    #[test]
    fn test_validate_rejects_negative_sales() {
        let result = brand("a", -5, true).validate();
        match result {
            Err(EngineError::InvalidInput { entity, message }) => {
                assert_eq!(entity, "a");
                assert!(message.contains("sales"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_reserved_ids() {
        for id in ["consolidated", "shared_allocations"] {
            match brand(id, 100, true).validate() {
                Err(EngineError::InvalidInput { entity, message }) => {
                    assert_eq!(entity, id);
                    assert!(message.contains("reserved"));
                }
                other => panic!("Expected InvalidInput, got {:?}", other),
            }
        }
        assert!(brand("consolidated_foods", 100, true).validate().is_ok());
    }

    #[test]
    fn test_universe_rejects_duplicates() {
        let result = BrandUniverse::new(vec![brand("a", 1, true), brand("a", 2, true)]);
        assert!(matches!(result, Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_eligible_for_empty_list_selects_active_brands() {
        let universe = BrandUniverse::new(vec![
            brand("c", 1, true),
            brand("a", 1, true),
            brand("b", 1, false),
        ])
        .unwrap();

        let eligible = universe.eligible_for("line", &shared(&[])).unwrap();
        let ids: Vec<&str> = eligible.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_eligible_for_explicit_list_drops_inactive_and_sorts() {
        let universe = BrandUniverse::new(vec![
            brand("a", 1, true),
            brand("b", 1, false),
            brand("c", 1, true),
        ])
        .unwrap();

        let eligible = universe.eligible_for("line", &shared(&["c", "b", "a"])).unwrap();
        let ids: Vec<&str> = eligible.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_eligible_for_unknown_brand_is_error() {
        let universe = BrandUniverse::new(vec![brand("a", 1, true)]).unwrap();
        let result = universe.eligible_for("exp_rent", &shared(&["a", "zeta"]));
        match result {
            Err(EngineError::InvalidInput { entity, message }) => {
                assert_eq!(entity, "exp_rent");
                assert!(message.contains("zeta"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }
}
