//! Branch-level cost aggregation.
//!
//! A [`BranchAggregator`] sums the costs of one branch (commercial, logistics
//! or administrative) per brand. Individual lines route their full cost to
//! the bound brand; shared lines are costed once and apportioned with
//! [`allocate`](super::allocate). Aggregation is atomic: the first failing
//! line aborts the whole branch.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, BenefitFactorTable, Branch, BrandId, BrandUniverse, LineKind, ResourceLine,
    SharedAllocation,
};

use super::allocation::allocate;
use super::expense::calculate_expense_cost;
use super::payroll::calculate_payroll_cost;
use super::vehicle::calculate_vehicle_cost;

/// The rule identifier recorded on shared allocation audit steps.
pub const SHARED_ALLOCATION_RULE_ID: &str = "shared_allocation";

/// Monthly cost of any resource line.
#[derive(Debug, Clone)]
pub struct LineCost {
    /// The line this cost belongs to.
    pub line_id: String,
    /// Kind of line.
    pub kind: LineKind,
    /// Total monthly cost, rounded to the minor unit.
    pub total: Decimal,
    /// The audit step recording the cost calculation.
    pub audit_step: AuditStep,
}

/// Dispatches a resource line to its calculator.
pub fn calculate_line_cost(
    line: &ResourceLine,
    factors: &BenefitFactorTable,
    step_number: u32,
) -> EngineResult<LineCost> {
    let (total, audit_step) = match line {
        ResourceLine::Staffing(staffing) => {
            let cost = calculate_payroll_cost(staffing, factors, step_number)?;
            (cost.total, cost.audit_step)
        }
        ResourceLine::Vehicle(vehicle) => {
            let cost = calculate_vehicle_cost(vehicle, step_number)?;
            (cost.total, cost.audit_step)
        }
        ResourceLine::Expense(expense) => {
            let cost = calculate_expense_cost(expense, step_number)?;
            (cost.total, cost.audit_step)
        }
    };

    Ok(LineCost {
        line_id: line.id().to_string(),
        kind: line.kind(),
        total,
        audit_step,
    })
}

/// One brand's cost within a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrandBranchCost {
    /// Cost from lines bound to the brand.
    pub individual: Decimal,
    /// Cost apportioned from shared lines.
    pub shared: Decimal,
    /// `individual + shared`.
    pub total: Decimal,
}

impl BrandBranchCost {
    fn add_individual(&mut self, amount: Decimal) {
        self.individual += amount;
        self.total += amount;
    }

    fn add_shared(&mut self, amount: Decimal) {
        self.shared += amount;
        self.total += amount;
    }
}

/// Output of one branch aggregation.
#[derive(Debug, Clone)]
pub struct BranchTotals {
    /// The aggregated branch.
    pub branch: Branch,
    /// Cost per brand, including universe brands outside the simulated subset
    /// that received a shared share.
    pub per_brand: BTreeMap<BrandId, BrandBranchCost>,
    /// Cost of every line in the branch, in processing order.
    pub line_costs: Vec<LineCost>,
    /// How each shared line was apportioned.
    pub shared_allocations: Vec<SharedAllocation>,
    /// Audit steps for line costs and allocations, in order.
    pub audit_steps: Vec<AuditStep>,
}

impl BranchTotals {
    /// Returns a brand's cost, zero if it received nothing.
    pub fn brand(&self, brand_id: &str) -> BrandBranchCost {
        self.per_brand.get(brand_id).copied().unwrap_or_default()
    }

    /// Sum of all line costs in the branch.
    pub fn total(&self) -> Decimal {
        self.line_costs.iter().map(|c| c.total).sum()
    }
}

/// Aggregates the lines of a single branch.
#[derive(Debug, Clone, Copy)]
pub struct BranchAggregator {
    branch: Branch,
}

impl BranchAggregator {
    /// Creates an aggregator for `branch`.
    pub fn new(branch: Branch) -> Self {
        Self { branch }
    }

    /// The branch this aggregator handles.
    pub fn branch(&self) -> Branch {
        self.branch
    }

    /// Costs and distributes every line of the branch.
    ///
    /// `step_number` is the number given to the first audit step; the
    /// returned `audit_steps` are numbered consecutively from it.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when a line belongs to another branch, an individual
    ///   line is passed as shared (or vice versa), or an individual line is
    ///   bound to a brand missing from `universe`.
    /// - Any calculator error, unchanged.
    /// - Any allocator error, tagged with the shared line's id.
    pub fn aggregate(
        &self,
        individual_lines: &[&ResourceLine],
        shared_lines: &[&ResourceLine],
        universe: &BrandUniverse,
        factors: &BenefitFactorTable,
        step_number: u32,
    ) -> EngineResult<BranchTotals> {
        let mut step_number = step_number;
        let mut totals = BranchTotals {
            branch: self.branch,
            per_brand: BTreeMap::new(),
            line_costs: Vec::with_capacity(individual_lines.len() + shared_lines.len()),
            shared_allocations: Vec::with_capacity(shared_lines.len()),
            audit_steps: Vec::new(),
        };

        for line in individual_lines {
            self.check_branch(line)?;
            let brand_id = line.assignment().brand_id().ok_or_else(|| {
                EngineError::invalid_input(line.id(), "shared line passed as individual")
            })?;
            if !universe.contains(brand_id) {
                return Err(EngineError::invalid_input(
                    line.id(),
                    format!("bound brand '{}' is not part of the scenario", brand_id),
                ));
            }

            let cost = calculate_line_cost(line, factors, step_number)?;
            step_number += 1;

            totals
                .per_brand
                .entry(brand_id.to_string())
                .or_default()
                .add_individual(cost.total);
            totals.audit_steps.push(cost.audit_step.clone());
            totals.line_costs.push(cost);
        }

        for line in shared_lines {
            self.check_branch(line)?;
            let shared = line.assignment().as_shared().ok_or_else(|| {
                EngineError::invalid_input(line.id(), "individual line passed as shared")
            })?;

            let cost = calculate_line_cost(line, factors, step_number)?;
            step_number += 1;

            let eligible = universe.eligible_for(line.id(), shared)?;
            let shares = allocate(
                cost.total,
                shared.criterion,
                &eligible,
                shared.dedication.as_ref(),
            )
            .map_err(|e| e.at_line(line.id()))?;

            debug!(
                branch = %self.branch,
                line_id = %line.id(),
                total = %cost.total,
                criterion = %shared.criterion,
                eligible = eligible.len(),
                "Allocated shared line"
            );

            for (brand_id, share) in &shares {
                totals
                    .per_brand
                    .entry(brand_id.clone())
                    .or_default()
                    .add_shared(*share);
            }

            let allocation = SharedAllocation {
                line_id: cost.line_id.clone(),
                branch: self.branch,
                kind: cost.kind,
                total_amount: cost.total,
                criterion: shared.criterion,
                dedication_applied: shared.dedication.is_some(),
                shares,
            };

            totals.audit_steps.push(cost.audit_step.clone());
            totals
                .audit_steps
                .push(allocation_audit_step(&allocation, step_number));
            step_number += 1;

            totals.line_costs.push(cost);
            totals.shared_allocations.push(allocation);
        }

        debug!(
            branch = %self.branch,
            individual_lines = individual_lines.len(),
            shared_lines = shared_lines.len(),
            total = %totals.total(),
            "Aggregated branch"
        );

        Ok(totals)
    }

    fn check_branch(&self, line: &ResourceLine) -> EngineResult<()> {
        if line.branch() != self.branch {
            return Err(EngineError::invalid_input(
                line.id(),
                format!(
                    "line belongs to branch '{}', not '{}'",
                    line.branch(),
                    self.branch
                ),
            ));
        }
        Ok(())
    }
}

fn allocation_audit_step(allocation: &SharedAllocation, step_number: u32) -> AuditStep {
    let shares: BTreeMap<&str, String> = allocation
        .shares
        .iter()
        .map(|(id, share)| (id.as_str(), share.normalize().to_string()))
        .collect();

    let basis = if allocation.dedication_applied {
        "dedication weights".to_string()
    } else {
        allocation.criterion.to_string()
    };

    AuditStep {
        step_number,
        rule_id: SHARED_ALLOCATION_RULE_ID.to_string(),
        rule_name: "Shared Cost Allocation".to_string(),
        subject: allocation.line_id.clone(),
        input: serde_json::json!({
            "total_amount": allocation.total_amount.normalize().to_string(),
            "criterion": allocation.criterion,
            "dedication_applied": allocation.dedication_applied,
            "eligible_brands": allocation.shares.keys().collect::<Vec<_>>()
        }),
        output: serde_json::json!({
            "shares": shares
        }),
        reasoning: format!(
            "Shared {} line ${} split across {} brand(s) by {}",
            allocation.branch,
            allocation.total_amount.normalize(),
            allocation.shares.len(),
            basis
        ),
    }
}
