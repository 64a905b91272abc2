//! Payroll cost calculation.
//!
//! This module computes the fully-loaded monthly cost of one staffing line:
//! base salary, statutory benefit load, transport subsidy, and allowances.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, BenefitFactorTable, StaffingLine};

use super::rounding::round_money;

/// The rule identifier recorded on payroll audit steps.
pub const PAYROLL_RULE_ID: &str = "payroll_cost";

/// The result of a payroll calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct PayrollCost {
    /// The staffing line this cost belongs to.
    pub line_id: String,
    /// Headcount on the line.
    pub quantity: u32,
    /// Aggregate benefit factor applied.
    pub benefit_factor: Decimal,
    /// `base_salary × quantity`.
    pub base_cost: Decimal,
    /// Benefit factor applied to salary plus benefit-bearing allowances.
    pub benefit_load: Decimal,
    /// Transport subsidy for all heads.
    pub transport_subsidy: Decimal,
    /// All allowances for all heads.
    pub allowances_total: Decimal,
    /// Cost of one head, rounded to the minor unit.
    pub per_head_cost: Decimal,
    /// Total monthly cost: `per_head_cost × quantity`.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the monthly cost of a staffing line.
///
/// - Base cost is `base_salary × quantity`.
/// - Benefit-bearing allowances are added to the salary before applying the
///   category's aggregate factor; other allowances are added untouched.
/// - The transport subsidy is a flat per-head amount, paid only when the line
///   is eligible and the salary does not exceed the configured threshold. It
///   never carries the benefit factor.
/// - Rounding happens once, on the per-head sum. The line total is that
///   per-head cost times the quantity, so every head costs the same.
///
/// # Errors
///
/// Returns `InvalidInput` when the quantity is zero, the salary or an
/// allowance is negative, or the category is missing from the factor table.
///
/// # Examples
///
/// ```
/// use cost_simulator::calculation::calculate_payroll_cost;
/// use cost_simulator::models::{
///     Allowance, Assignment, BenefitComponent, BenefitFactorTable, BenefitFactors, Branch,
///     StaffingLine, TransportSubsidyRule,
/// };
/// use rust_decimal::Decimal;
/// use std::collections::BTreeMap;
/// use std::str::FromStr;
///
/// let dec = |s: &str| Decimal::from_str(s).unwrap();
/// let mut categories = BTreeMap::new();
/// categories.insert(
///     "commercial".to_string(),
///     BenefitFactors { pension: dec("0.402"), ..BenefitFactors::default() },
/// );
/// let table = BenefitFactorTable {
///     transport_subsidy: TransportSubsidyRule {
///         monthly_amount: dec("200000"),
///         salary_threshold: dec("2847000"),
///     },
///     categories,
/// };
/// let line = StaffingLine {
///     id: "stf_rep".to_string(),
///     branch: Branch::Commercial,
///     position: "Sales representative".to_string(),
///     category: "commercial".to_string(),
///     base_salary: dec("2150000"),
///     quantity: 1,
///     transport_subsidy_eligible: true,
///     allowances: vec![Allowance {
///         name: "data_plan".to_string(),
///         amount: dec("35000"),
///         benefit_bearing: false,
///     }],
///     assignment: Assignment::Individual { brand_id: "alpha".to_string() },
/// };
///
/// let cost = calculate_payroll_cost(&line, &table, 1).unwrap();
/// assert_eq!(cost.total, dec("3249300"));
/// ```
pub fn calculate_payroll_cost(
    line: &StaffingLine,
    factors: &BenefitFactorTable,
    step_number: u32,
) -> EngineResult<PayrollCost> {
    line.validate()?;

    let category = factors.get(&line.category).ok_or_else(|| {
        EngineError::invalid_input(
            &line.id,
            format!(
                "profile category '{}' not found in benefit factor table",
                line.category
            ),
        )
    })?;

    let quantity = Decimal::from(line.quantity);
    let salary = line.base_salary;
    let factor = category.aggregate_factor();

    let bearing_per_head: Decimal = line
        .allowances
        .iter()
        .filter(|a| a.benefit_bearing)
        .map(|a| a.amount)
        .sum();
    let non_bearing_per_head: Decimal = line
        .allowances
        .iter()
        .filter(|a| !a.benefit_bearing)
        .map(|a| a.amount)
        .sum();

    let loaded_base = salary + bearing_per_head;
    let subsidy_rule = &factors.transport_subsidy;
    let subsidy_applies = line.transport_subsidy_eligible && subsidy_rule.applies_to(salary);
    let subsidy_per_head = if subsidy_applies {
        subsidy_rule.monthly_amount
    } else {
        Decimal::ZERO
    };

    let base_cost = salary * quantity;
    let benefit_load = loaded_base * factor * quantity;
    let transport_subsidy = subsidy_per_head * quantity;
    let allowances_total = (bearing_per_head + non_bearing_per_head) * quantity;

    let per_head_cost = round_money(
        salary + loaded_base * factor + subsidy_per_head + bearing_per_head + non_bearing_per_head,
    );
    let total = per_head_cost * quantity;

    let components: serde_json::Map<String, serde_json::Value> = category
        .applicable_components()
        .into_iter()
        .map(|(component, pct)| {
            (
                component.as_str().to_string(),
                serde_json::Value::String((loaded_base * pct * quantity).normalize().to_string()),
            )
        })
        .collect();

    let subsidy_note = if subsidy_applies {
        format!(" + subsidy ${} x {}", subsidy_per_head.normalize(), line.quantity)
    } else if line.transport_subsidy_eligible {
        format!(
            " (no subsidy: salary above threshold ${})",
            subsidy_rule.salary_threshold.normalize()
        )
    } else {
        String::new()
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: PAYROLL_RULE_ID.to_string(),
        rule_name: "Payroll Cost".to_string(),
        subject: line.id.clone(),
        input: serde_json::json!({
            "category": line.category,
            "base_salary": salary.normalize().to_string(),
            "quantity": line.quantity,
            "transport_subsidy_eligible": line.transport_subsidy_eligible,
            "benefit_bearing_allowances": bearing_per_head.normalize().to_string(),
            "other_allowances": non_bearing_per_head.normalize().to_string()
        }),
        output: serde_json::json!({
            "benefit_factor": factor.normalize().to_string(),
            "base_cost": base_cost.normalize().to_string(),
            "benefit_load": benefit_load.normalize().to_string(),
            "benefit_components": components,
            "transport_subsidy": transport_subsidy.normalize().to_string(),
            "allowances_total": allowances_total.normalize().to_string(),
            "per_head_cost": per_head_cost.normalize().to_string(),
            "total": total.normalize().to_string()
        }),
        reasoning: format!(
            "({} x ${} x (1 + {})) + benefit load on allowances{} + allowances ${} = ${}",
            line.quantity,
            salary.normalize(),
            factor.normalize(),
            subsidy_note,
            allowances_total.normalize(),
            total.normalize()
        ),
    };

    Ok(PayrollCost {
        line_id: line.id.clone(),
        quantity: line.quantity,
        benefit_factor: factor,
        base_cost,
        benefit_load,
        transport_subsidy,
        allowances_total,
        per_head_cost,
        total,
        audit_step,
    })
}
