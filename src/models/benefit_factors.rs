//! Statutory benefit factors keyed by worker-profile category.
//!
//! The [`BenefitFactorTable`] is loaded once per simulation run and passed
//! explicitly to the payroll calculator. It is immutable and can be shared
//! across concurrent runs.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One statutory component of the benefit factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitComponent {
    /// Employer health contribution.
    Health,
    /// Employer pension contribution.
    Pension,
    /// Occupational risk insurance.
    RiskInsurance,
    /// Severance (cesantías).
    Severance,
    /// Interest on severance.
    SeveranceInterest,
    /// Service bonus (prima).
    Bonus,
    /// Paid vacation.
    Vacation,
    /// Family compensation fund.
    FamilyCompensation,
    /// Payroll taxes (training and family welfare levies).
    PayrollTaxes,
}

impl BenefitComponent {
    /// Every component, in reporting order.
    pub const ALL: [BenefitComponent; 9] = [
        BenefitComponent::Health,
        BenefitComponent::Pension,
        BenefitComponent::RiskInsurance,
        BenefitComponent::Severance,
        BenefitComponent::SeveranceInterest,
        BenefitComponent::Bonus,
        BenefitComponent::Vacation,
        BenefitComponent::FamilyCompensation,
        BenefitComponent::PayrollTaxes,
    ];

    /// Snake-case name used in audit output.
    pub fn as_str(&self) -> &'static str {
        match self {
            BenefitComponent::Health => "health",
            BenefitComponent::Pension => "pension",
            BenefitComponent::RiskInsurance => "risk_insurance",
            BenefitComponent::Severance => "severance",
            BenefitComponent::SeveranceInterest => "severance_interest",
            BenefitComponent::Bonus => "bonus",
            BenefitComponent::Vacation => "vacation",
            BenefitComponent::FamilyCompensation => "family_compensation",
            BenefitComponent::PayrollTaxes => "payroll_taxes",
        }
    }
}

impl fmt::Display for BenefitComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Benefit percentages for one worker-profile category.
///
/// Each percentage is a fraction of one (0.12 = 12%). Components listed in
/// `exemptions` are zeroed before summing.
///
/// # Example
///
/// ```
/// use cost_simulator::models::{BenefitComponent, BenefitFactors};
/// use rust_decimal::Decimal;
///
/// let factors = BenefitFactors {
///     health: Decimal::new(85, 3),
///     pension: Decimal::new(12, 2),
///     exemptions: vec![BenefitComponent::Health],
///     ..BenefitFactors::default()
/// };
/// assert_eq!(factors.aggregate_factor(), Decimal::new(12, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BenefitFactors {
    /// Employer health contribution.
    #[serde(default)]
    pub health: Decimal,
    /// Employer pension contribution.
    #[serde(default)]
    pub pension: Decimal,
    /// Occupational risk insurance.
    #[serde(default)]
    pub risk_insurance: Decimal,
    /// Severance.
    #[serde(default)]
    pub severance: Decimal,
    /// Interest on severance.
    #[serde(default)]
    pub severance_interest: Decimal,
    /// Service bonus.
    #[serde(default)]
    pub bonus: Decimal,
    /// Paid vacation.
    #[serde(default)]
    pub vacation: Decimal,
    /// Family compensation fund.
    #[serde(default)]
    pub family_compensation: Decimal,
    /// Payroll taxes.
    #[serde(default)]
    pub payroll_taxes: Decimal,
    /// Components this category is exempt from.
    #[serde(default)]
    pub exemptions: Vec<BenefitComponent>,
}

impl BenefitFactors {
    /// Returns the configured percentage for a component, ignoring exemptions.
    pub fn component(&self, component: BenefitComponent) -> Decimal {
        match component {
            BenefitComponent::Health => self.health,
            BenefitComponent::Pension => self.pension,
            BenefitComponent::RiskInsurance => self.risk_insurance,
            BenefitComponent::Severance => self.severance,
            BenefitComponent::SeveranceInterest => self.severance_interest,
            BenefitComponent::Bonus => self.bonus,
            BenefitComponent::Vacation => self.vacation,
            BenefitComponent::FamilyCompensation => self.family_compensation,
            BenefitComponent::PayrollTaxes => self.payroll_taxes,
        }
    }

    /// Returns true if the category is exempt from the component.
    pub fn is_exempt(&self, component: BenefitComponent) -> bool {
        self.exemptions.contains(&component)
    }

    /// Non-exempt components with their percentages.
    pub fn applicable_components(&self) -> Vec<(BenefitComponent, Decimal)> {
        BenefitComponent::ALL
            .iter()
            .filter(|c| !self.is_exempt(**c))
            .map(|c| (*c, self.component(*c)))
            .collect()
    }

    /// Sum of all non-exempt components.
    pub fn aggregate_factor(&self) -> Decimal {
        self.applicable_components()
            .into_iter()
            .map(|(_, pct)| pct)
            .sum()
    }

    /// Validates that every percentage lies in `[0, 1]`.
    pub fn validate(&self, category: &str) -> EngineResult<()> {
        for component in BenefitComponent::ALL {
            let pct = self.component(component);
            if pct < Decimal::ZERO || pct > Decimal::ONE {
                return Err(EngineError::invalid_input(
                    category,
                    format!("benefit component '{}' must be within [0, 1], got {}", component, pct),
                ));
            }
        }
        Ok(())
    }
}

/// Flat monthly transport subsidy paid to eligible low-salary workers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransportSubsidyRule {
    /// Subsidy paid per head per month.
    pub monthly_amount: Decimal,
    /// Highest base salary that still qualifies (inclusive).
    pub salary_threshold: Decimal,
}

impl TransportSubsidyRule {
    /// Returns true if a worker with this salary qualifies.
    pub fn applies_to(&self, base_salary: Decimal) -> bool {
        base_salary <= self.salary_threshold
    }
}

/// Statutory factor table for one year or scenario.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BenefitFactorTable {
    /// Transport subsidy rule.
    pub transport_subsidy: TransportSubsidyRule,
    /// Benefit factors by worker-profile category.
    pub categories: BTreeMap<String, BenefitFactors>,
}

impl BenefitFactorTable {
    /// Looks up the factors for a category.
    pub fn get(&self, category: &str) -> Option<&BenefitFactors> {
        self.categories.get(category)
    }

    /// Validates every category and the subsidy rule.
    pub fn validate(&self) -> EngineResult<()> {
        if self.transport_subsidy.monthly_amount < Decimal::ZERO
            || self.transport_subsidy.salary_threshold < Decimal::ZERO
        {
            return Err(EngineError::invalid_input(
                "transport_subsidy",
                "subsidy amount and threshold must not be negative",
            ));
        }
        for (category, factors) in &self.categories {
            factors.validate(category)?;
        }
        Ok(())
    }
}
