//! Shared expense cost.

use rust_decimal::Decimal;

use crate::error::EngineResult;
use crate::models::{AuditStep, ExpenseLine};

use super::rounding::round_money;

/// The rule identifier recorded on expense audit steps.
pub const EXPENSE_RULE_ID: &str = "expense_cost";

/// The result of an expense calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct ExpenseCost {
    /// The expense line this cost belongs to.
    pub line_id: String,
    /// Monthly amount rounded to the minor unit.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the monthly cost of a generic expense line.
pub fn calculate_expense_cost(line: &ExpenseLine, step_number: u32) -> EngineResult<ExpenseCost> {
    line.validate()?;

    let total = round_money(line.monthly_amount);
    let audit_step = AuditStep {
        step_number,
        rule_id: EXPENSE_RULE_ID.to_string(),
        rule_name: "Expense Cost".to_string(),
        subject: line.id.clone(),
        input: serde_json::json!({
            "description": line.description,
            "monthly_amount": line.monthly_amount.normalize().to_string()
        }),
        output: serde_json::json!({
            "total": total.normalize().to_string()
        }),
        reasoning: format!("Monthly expense '{}' = ${}", line.description, total.normalize()),
    };

    Ok(ExpenseCost {
        line_id: line.id.clone(),
        total,
        audit_step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{AllocationCriterion, Assignment, Branch, SharedAssignment};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_line(amount: &str) -> ExpenseLine {
        ExpenseLine {
            id: "exp_rent".to_string(),
            branch: Branch::Administrative,
            description: "Warehouse rent".to_string(),
            monthly_amount: dec(amount),
            assignment: Assignment::Shared(SharedAssignment {
                criterion: AllocationCriterion::VolumeProportional,
                eligible_brands: vec![],
                dedication: None,
            }),
        }
    }

    #[test]
    fn test_expense_total_is_rounded_amount() {
        let result = calculate_expense_cost(&create_test_line("12000000.005"), 3).unwrap();
        assert_eq!(result.total, dec("12000000.01"));
        assert_eq!(result.audit_step.step_number, 3);
        assert_eq!(result.audit_step.rule_id, "expense_cost");
    }

    #[test]
    fn test_negative_expense_is_invalid() {
        assert!(matches!(
            calculate_expense_cost(&create_test_line("-5"), 1),
            Err(EngineError::InvalidInput { .. })
        ));
    }
}
