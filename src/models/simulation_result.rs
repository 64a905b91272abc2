//! Simulation result models.
//!
//! This module contains the [`SimulationResult`] type and its associated
//! structures: per-brand results, the consolidated block, the shared-cost
//! allocation audit trail, and the audit trace used to explain every
//! calculation decision.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{AllocationCriterion, Branch, BrandId, LineKind};

/// Top-level key of the consolidated block in the flat result.
pub const FLAT_CONSOLIDATED_KEY: &str = "consolidated";

/// Top-level key of the shared allocation trail in the flat result.
pub const FLAT_SHARED_ALLOCATIONS_KEY: &str = "shared_allocations";

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The line or brand the rule was applied to.
    pub subject: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during a simulation.
///
/// Warnings indicate issues that don't prevent the run from completing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
    /// The entity the warning is about.
    pub subject: String,
}

/// The complete audit trace for a simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during the run.
    pub warnings: Vec<AuditWarning>,
    /// The total run duration in microseconds.
    pub duration_us: u64,
}

/// How one shared line was apportioned across brands.
///
/// `shares` covers every eligible brand, including brands outside the
/// simulated subset, and always sums to `total_amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedAllocation {
    /// The shared line.
    pub line_id: String,
    /// Branch the line belongs to.
    pub branch: Branch,
    /// Kind of line.
    pub kind: LineKind,
    /// Total monthly cost of the line.
    pub total_amount: Decimal,
    /// Criterion configured on the line.
    pub criterion: AllocationCriterion,
    /// Whether explicit dedication weights replaced the criterion.
    pub dedication_applied: bool,
    /// Share per brand.
    pub shares: BTreeMap<BrandId, Decimal>,
}

/// Result for one simulated brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandResult {
    /// Brand identifier.
    pub brand_id: BrandId,
    /// Brand name.
    pub name: String,
    /// Monthly sales.
    pub sales: Decimal,
    /// Commercial branch cost.
    pub cost_commercial: Decimal,
    /// Logistics branch cost.
    pub cost_logistics: Decimal,
    /// Administrative branch cost.
    pub cost_admin: Decimal,
    /// Sum of all branch costs.
    pub cost_total: Decimal,
    /// Portion of `cost_total` that came from shared lines.
    pub shared_cost: Decimal,
    /// Margin in percentage points; `None` when sales are zero.
    pub margin_pct: Option<Decimal>,
    /// Cost as percentage of sales; `None` when sales are zero.
    pub cost_pct: Option<Decimal>,
}

/// Sums across every simulated brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedResult {
    /// Number of simulated brands.
    pub brand_count: usize,
    /// Total sales.
    pub sales: Decimal,
    /// Total commercial cost.
    pub cost_commercial: Decimal,
    /// Total logistics cost.
    pub cost_logistics: Decimal,
    /// Total administrative cost.
    pub cost_admin: Decimal,
    /// Total cost.
    pub cost_total: Decimal,
    /// Portion of `cost_total` that came from shared lines.
    pub shared_cost: Decimal,
    /// Consolidated margin; `None` when total sales are zero.
    pub margin_pct: Option<Decimal>,
    /// Consolidated cost percentage; `None` when total sales are zero.
    pub cost_pct: Option<Decimal>,
}

/// The deterministic outcome of a simulation.
///
/// Contains no timestamps or random identifiers, so two runs over the same
/// data snapshot compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Scenario that was simulated.
    pub scenario_id: String,
    /// Per-brand results keyed by brand id.
    pub brands: BTreeMap<BrandId, BrandResult>,
    /// Consolidated block.
    pub consolidated: ConsolidatedResult,
    /// Shared-cost audit trail.
    pub shared_allocations: Vec<SharedAllocation>,
    /// Non-fatal per-brand warnings.
    pub warnings: Vec<AuditWarning>,
}

impl SimulationResult {
    /// Looks up a brand's result.
    pub fn brand(&self, brand_id: &str) -> Option<&BrandResult> {
        self.brands.get(brand_id)
    }

    /// Serializes to the flat reporting structure:
    /// `{brand_id: {...}, "consolidated": {...}, "shared_allocations": [...]}`.
    ///
    /// # Example
    ///
    /// ```
    /// use cost_simulator::models::{ConsolidatedResult, SimulationResult};
    /// use rust_decimal::Decimal;
    /// use std::collections::BTreeMap;
    ///
    /// let result = SimulationResult {
    ///     scenario_id: "base".to_string(),
    ///     brands: BTreeMap::new(),
    ///     consolidated: ConsolidatedResult {
    ///         brand_count: 0,
    ///         sales: Decimal::ZERO,
    ///         cost_commercial: Decimal::ZERO,
    ///         cost_logistics: Decimal::ZERO,
    ///         cost_admin: Decimal::ZERO,
    ///         cost_total: Decimal::ZERO,
    ///         shared_cost: Decimal::ZERO,
    ///         margin_pct: None,
    ///         cost_pct: None,
    ///     },
    ///     shared_allocations: vec![],
    ///     warnings: vec![],
    /// };
    /// let flat = result.to_flat_json();
    /// assert!(flat["consolidated"]["margin_pct"].is_null());
    /// ```
    pub fn to_flat_json(&self) -> serde_json::Value {
        let mut root = serde_json::Map::new();
        for (brand_id, brand) in &self.brands {
            root.insert(
                brand_id.clone(),
                json!({
                    "sales": brand.sales,
                    "cost_commercial": brand.cost_commercial,
                    "cost_logistics": brand.cost_logistics,
                    "cost_admin": brand.cost_admin,
                    "cost_total": brand.cost_total,
                    "margin_pct": brand.margin_pct,
                    "cost_pct": brand.cost_pct,
                }),
            );
        }

        let consolidated = &self.consolidated;
        root.insert(
            FLAT_CONSOLIDATED_KEY.to_string(),
            json!({
                "sales": consolidated.sales,
                "cost_commercial": consolidated.cost_commercial,
                "cost_logistics": consolidated.cost_logistics,
                "cost_admin": consolidated.cost_admin,
                "cost_total": consolidated.cost_total,
                "margin_pct": consolidated.margin_pct,
                "cost_pct": consolidated.cost_pct,
            }),
        );

        let allocations: Vec<serde_json::Value> = self
            .shared_allocations
            .iter()
            .map(|a| {
                json!({
                    "line_id": a.line_id,
                    "total_amount": a.total_amount,
                    "criterion": a.criterion,
                    "shares": a.shares,
                })
            })
            .collect();
        root.insert(
            FLAT_SHARED_ALLOCATIONS_KEY.to_string(),
            serde_json::Value::Array(allocations),
        );

        serde_json::Value::Object(root)
    }
}

/// A completed simulation run: the deterministic result plus run metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRun {
    /// Unique identifier for this run.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// The version of the engine that performed the run.
    pub engine_version: String,
    /// The simulation result.
    pub result: SimulationResult,
    /// Complete audit trace of calculation decisions.
    pub audit_trace: AuditTrace,
}
