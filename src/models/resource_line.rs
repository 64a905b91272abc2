//! Resource line models: staffing, vehicles, and generic expenses.
//!
//! Every line is a fixed-shape record. Lines are validated when they enter
//! the engine (see [`ResourceLine::validate`]) so calculators never see a
//! loosely shaped definition.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

use super::BrandId;

/// The branch of the business a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    /// Sales force and trade marketing.
    Commercial,
    /// Warehousing and delivery.
    Logistics,
    /// Back office.
    Administrative,
}

impl Branch {
    /// All branches in aggregation order.
    pub const ALL: [Branch; 3] = [Branch::Commercial, Branch::Logistics, Branch::Administrative];

    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Branch::Commercial => "commercial",
            Branch::Logistics => "logistics",
            Branch::Administrative => "administrative",
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apportionment criterion for a shared line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationCriterion {
    /// Proportional to monthly sales.
    SalesProportional,
    /// Proportional to operational volume.
    VolumeProportional,
    /// Proportional to headcount.
    HeadcountProportional,
    /// Proportional to measured usage units.
    MeasuredUsage,
    /// Same share for every eligible brand.
    EqualSplit,
}

impl AllocationCriterion {
    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AllocationCriterion::SalesProportional => "sales_proportional",
            AllocationCriterion::VolumeProportional => "volume_proportional",
            AllocationCriterion::HeadcountProportional => "headcount_proportional",
            AllocationCriterion::MeasuredUsage => "measured_usage",
            AllocationCriterion::EqualSplit => "equal_split",
        }
    }
}

impl fmt::Display for AllocationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a shared line is apportioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedAssignment {
    /// Apportionment criterion.
    pub criterion: AllocationCriterion,
    /// Brands that may receive a share. Empty means every active brand.
    #[serde(default)]
    pub eligible_brands: Vec<BrandId>,
    /// Fixed per-brand weights (fractions of one) overriding the criterion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedication: Option<BTreeMap<BrandId, Decimal>>,
}

/// Whether a line is bound to one brand or shared across several.
///
/// # Example
///
/// ```
/// use cost_simulator::models::{AllocationCriterion, Assignment};
///
/// let yaml = "mode: shared\ncriterion: equal_split\n";
/// let assignment: Assignment = serde_yaml::from_str(yaml).unwrap();
/// assert!(matches!(
///     assignment,
///     Assignment::Shared(ref s) if s.criterion == AllocationCriterion::EqualSplit
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Assignment {
    /// The whole cost goes to one brand.
    Individual {
        /// The owning brand.
        brand_id: BrandId,
    },
    /// The cost is apportioned across brands.
    Shared(SharedAssignment),
}

impl Assignment {
    /// Returns the shared assignment, if any.
    pub fn as_shared(&self) -> Option<&SharedAssignment> {
        match self {
            Assignment::Shared(shared) => Some(shared),
            Assignment::Individual { .. } => None,
        }
    }

    /// Returns the owning brand for individual lines.
    pub fn brand_id(&self) -> Option<&str> {
        match self {
            Assignment::Individual { brand_id } => Some(brand_id),
            Assignment::Shared(_) => None,
        }
    }

    /// Returns true if the line is shared.
    pub fn is_shared(&self) -> bool {
        matches!(self, Assignment::Shared(_))
    }

    /// Returns true if the assignment can deliver cost to the brand.
    ///
    /// A shared line with an empty eligible list reaches every brand.
    pub fn serves(&self, brand_id: &str) -> bool {
        match self {
            Assignment::Individual { brand_id: owner } => owner == brand_id,
            Assignment::Shared(shared) => {
                shared.eligible_brands.is_empty()
                    || shared.eligible_brands.iter().any(|b| b == brand_id)
            }
        }
    }

    fn validate(&self, line_id: &str) -> EngineResult<()> {
        match self {
            Assignment::Individual { brand_id } if brand_id.trim().is_empty() => Err(
                EngineError::invalid_input(line_id, "individual line must name a brand"),
            ),
            Assignment::Individual { .. } => Ok(()),
            Assignment::Shared(shared) => {
                if let Some(dedication) = &shared.dedication {
                    if dedication.is_empty() {
                        return Err(EngineError::DedicationMismatch {
                            message: "dedication map is empty".to_string(),
                            line_id: Some(line_id.to_string()),
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

/// A monthly per-head allowance on a staffing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowance {
    /// Name of the allowance (e.g. "data_plan", "housing").
    pub name: String,
    /// Monthly amount per head.
    pub amount: Decimal,
    /// Whether the allowance is subject to the benefit factor.
    #[serde(default)]
    pub benefit_bearing: bool,
}

/// One personnel resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingLine {
    /// Unique identifier.
    pub id: String,
    /// Branch the position belongs to.
    pub branch: Branch,
    /// Position title.
    #[serde(default)]
    pub position: String,
    /// Worker-profile category, the key into the benefit factor table.
    pub category: String,
    /// Monthly base salary per head.
    pub base_salary: Decimal,
    /// Headcount on this line.
    pub quantity: u32,
    /// Whether the position is eligible for the transport subsidy.
    #[serde(default)]
    pub transport_subsidy_eligible: bool,
    /// Monthly allowances per head.
    #[serde(default)]
    pub allowances: Vec<Allowance>,
    /// Individual or shared assignment.
    pub assignment: Assignment,
}

impl StaffingLine {
    /// Validates quantity, salary, and allowance amounts.
    pub fn validate(&self) -> EngineResult<()> {
        if self.quantity < 1 {
            return Err(EngineError::invalid_input(
                &self.id,
                "quantity must be at least 1",
            ));
        }
        if self.base_salary < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                &self.id,
                format!("base salary must not be negative, got {}", self.base_salary),
            ));
        }
        if let Some(allowance) = self.allowances.iter().find(|a| a.amount < Decimal::ZERO) {
            return Err(EngineError::invalid_input(
                &self.id,
                format!("allowance '{}' must not be negative", allowance.name),
            ));
        }
        self.assignment.validate(&self.id)
    }
}

/// Vehicle ownership scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleScheme {
    /// Company-owned vehicle.
    Owned,
    /// Leased (renting) vehicle.
    Leased,
    /// Third-party carrier at a contracted rate.
    ThirdParty,
}

impl VehicleScheme {
    /// Snake-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleScheme::Owned => "owned",
            VehicleScheme::Leased => "leased",
            VehicleScheme::ThirdParty => "third_party",
        }
    }

    /// Cost components that make up this scheme's monthly cost.
    pub fn components(&self) -> &'static [VehicleComponent] {
        match self {
            VehicleScheme::Owned => &[
                VehicleComponent::Depreciation,
                VehicleComponent::Maintenance,
                VehicleComponent::Insurance,
                VehicleComponent::Fuel,
                VehicleComponent::Taxes,
            ],
            VehicleScheme::Leased => &[
                VehicleComponent::MonthlyFee,
                VehicleComponent::Fuel,
                VehicleComponent::Washing,
                VehicleComponent::ReplacementReserve,
            ],
            VehicleScheme::ThirdParty => &[VehicleComponent::ContractedRate],
        }
    }

    /// Component that must be present for the scheme, if any.
    pub fn required_component(&self) -> Option<VehicleComponent> {
        match self {
            VehicleScheme::Owned => None,
            VehicleScheme::Leased => Some(VehicleComponent::MonthlyFee),
            VehicleScheme::ThirdParty => Some(VehicleComponent::ContractedRate),
        }
    }
}

impl fmt::Display for VehicleScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single monthly cost component of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleComponent {
    /// Monthly depreciation (owned).
    Depreciation,
    /// Maintenance (owned).
    Maintenance,
    /// Insurance (owned).
    Insurance,
    /// Fuel (owned, leased).
    Fuel,
    /// Vehicle taxes (owned).
    Taxes,
    /// Lease fee (leased).
    MonthlyFee,
    /// Washing (leased).
    Washing,
    /// Replacement-vehicle reserve (leased).
    ReplacementReserve,
    /// All-inclusive carrier rate (third party).
    ContractedRate,
}

impl VehicleComponent {
    /// Every component, in reporting order.
    pub const ALL: [VehicleComponent; 9] = [
        VehicleComponent::Depreciation,
        VehicleComponent::Maintenance,
        VehicleComponent::Insurance,
        VehicleComponent::Fuel,
        VehicleComponent::Taxes,
        VehicleComponent::MonthlyFee,
        VehicleComponent::Washing,
        VehicleComponent::ReplacementReserve,
        VehicleComponent::ContractedRate,
    ];

    /// Field name as it appears in input records.
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleComponent::Depreciation => "depreciation",
            VehicleComponent::Maintenance => "maintenance",
            VehicleComponent::Insurance => "insurance",
            VehicleComponent::Fuel => "fuel",
            VehicleComponent::Taxes => "taxes",
            VehicleComponent::MonthlyFee => "monthly_fee",
            VehicleComponent::Washing => "washing",
            VehicleComponent::ReplacementReserve => "replacement_reserve",
            VehicleComponent::ContractedRate => "contracted_rate",
        }
    }
}

/// Monthly per-unit cost components as received from the data source.
///
/// Which fields are meaningful depends on the [`VehicleScheme`]; the vehicle
/// calculator rejects populated fields outside the scheme.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleCostComponents {
    /// Monthly depreciation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depreciation: Option<Decimal>,
    /// Maintenance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<Decimal>,
    /// Insurance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance: Option<Decimal>,
    /// Fuel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel: Option<Decimal>,
    /// Vehicle taxes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxes: Option<Decimal>,
    /// Lease fee.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_fee: Option<Decimal>,
    /// Washing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub washing: Option<Decimal>,
    /// Replacement reserve.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_reserve: Option<Decimal>,
    /// Contracted carrier rate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contracted_rate: Option<Decimal>,
}

impl VehicleCostComponents {
    /// Returns the value of a component, if populated.
    pub fn get(&self, component: VehicleComponent) -> Option<Decimal> {
        match component {
            VehicleComponent::Depreciation => self.depreciation,
            VehicleComponent::Maintenance => self.maintenance,
            VehicleComponent::Insurance => self.insurance,
            VehicleComponent::Fuel => self.fuel,
            VehicleComponent::Taxes => self.taxes,
            VehicleComponent::MonthlyFee => self.monthly_fee,
            VehicleComponent::Washing => self.washing,
            VehicleComponent::ReplacementReserve => self.replacement_reserve,
            VehicleComponent::ContractedRate => self.contracted_rate,
        }
    }
}

/// One vehicle resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleLine {
    /// Unique identifier.
    pub id: String,
    /// Branch the vehicle serves.
    pub branch: Branch,
    /// Description (e.g. "NHR truck").
    #[serde(default)]
    pub description: String,
    /// Ownership scheme.
    pub scheme: VehicleScheme,
    /// Number of vehicles on this line.
    pub quantity: u32,
    /// Monthly per-unit cost components.
    pub components: VehicleCostComponents,
    /// Individual or shared assignment.
    pub assignment: Assignment,
}

impl VehicleLine {
    /// Validates quantity and assignment. Scheme consistency is checked by
    /// the vehicle calculator.
    pub fn validate(&self) -> EngineResult<()> {
        if self.quantity < 1 {
            return Err(EngineError::invalid_input(
                &self.id,
                "quantity must be at least 1",
            ));
        }
        self.assignment.validate(&self.id)
    }
}

/// A generic shared expense (rent, utilities, software licences).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseLine {
    /// Unique identifier.
    pub id: String,
    /// Branch the expense belongs to.
    pub branch: Branch,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Monthly amount.
    pub monthly_amount: Decimal,
    /// Must be a shared assignment.
    pub assignment: Assignment,
}

impl ExpenseLine {
    /// Validates the amount and that the expense is shared.
    pub fn validate(&self) -> EngineResult<()> {
        if self.monthly_amount < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                &self.id,
                format!("monthly amount must not be negative, got {}", self.monthly_amount),
            ));
        }
        if !self.assignment.is_shared() {
            return Err(EngineError::invalid_input(
                &self.id,
                "expense lines must use a shared assignment",
            ));
        }
        self.assignment.validate(&self.id)
    }
}

/// The kind of a resource line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    /// Personnel.
    Staffing,
    /// Vehicle.
    Vehicle,
    /// Generic expense.
    Expense,
}

/// Any cost line: staffing, vehicle, or expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceLine {
    /// Personnel line.
    Staffing(StaffingLine),
    /// Vehicle line.
    Vehicle(VehicleLine),
    /// Expense line.
    Expense(ExpenseLine),
}

impl ResourceLine {
    /// Line identifier.
    pub fn id(&self) -> &str {
        match self {
            ResourceLine::Staffing(line) => &line.id,
            ResourceLine::Vehicle(line) => &line.id,
            ResourceLine::Expense(line) => &line.id,
        }
    }

    /// Branch the line belongs to.
    pub fn branch(&self) -> Branch {
        match self {
            ResourceLine::Staffing(line) => line.branch,
            ResourceLine::Vehicle(line) => line.branch,
            ResourceLine::Expense(line) => line.branch,
        }
    }

    /// The line's assignment.
    pub fn assignment(&self) -> &Assignment {
        match self {
            ResourceLine::Staffing(line) => &line.assignment,
            ResourceLine::Vehicle(line) => &line.assignment,
            ResourceLine::Expense(line) => &line.assignment,
        }
    }

    /// The line's kind.
    pub fn kind(&self) -> LineKind {
        match self {
            ResourceLine::Staffing(_) => LineKind::Staffing,
            ResourceLine::Vehicle(_) => LineKind::Vehicle,
            ResourceLine::Expense(_) => LineKind::Expense,
        }
    }

    /// Validates the line's shape.
    pub fn validate(&self) -> EngineResult<()> {
        match self {
            ResourceLine::Staffing(line) => line.validate(),
            ResourceLine::Vehicle(line) => line.validate(),
            ResourceLine::Expense(line) => line.validate(),
        }
    }
}

impl From<StaffingLine> for ResourceLine {
    fn from(line: StaffingLine) -> Self {
        ResourceLine::Staffing(line)
    }
}

impl From<VehicleLine> for ResourceLine {
    fn from(line: VehicleLine) -> Self {
        ResourceLine::Vehicle(line)
    }
}

impl From<ExpenseLine> for ResourceLine {
    fn from(line: ExpenseLine) -> Self {
        ResourceLine::Expense(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn staffing(quantity: u32, salary: &str) -> StaffingLine {
        StaffingLine {
            id: "stf_reps".to_string(),
            branch: Branch::Commercial,
            position: "Sales representative".to_string(),
            category: "commercial".to_string(),
            base_salary: dec(salary),
            quantity,
            transport_subsidy_eligible: true,
            allowances: vec![],
            assignment: Assignment::Individual {
                brand_id: "alpha".to_string(),
            },
        }
    }

    #[test]
    fn test_deserialize_staffing_line_from_yaml() {
        let yaml = r#"
id: stf_reps
branch: commercial
category: commercial
base_salary: "2150000"
quantity: 4
transport_subsidy_eligible: true
allowances:
  - name: data_plan
    amount: "35000"
assignment:
  mode: individual
  brand_id: alpha
"#;
        let line: StaffingLine = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(line.base_salary, dec("2150000"));
        assert!(!line.allowances[0].benefit_bearing);
        assert_eq!(line.assignment.brand_id(), Some("alpha"));
    }

    #[test]
    fn test_deserialize_shared_assignment_with_dedication() {
        let yaml = r#"
mode: shared
criterion: headcount_proportional
eligible_brands: [alpha, beta]
dedication:
  alpha: "0.6"
  beta: "0.4"
"#;
        let assignment: Assignment = serde_yaml::from_str(yaml).unwrap();
        let shared = assignment.as_shared().unwrap();
        assert_eq!(shared.criterion, AllocationCriterion::HeadcountProportional);
        assert_eq!(shared.dedication.as_ref().unwrap()["alpha"], dec("0.6"));
    }

    #[test]
    fn test_vehicle_components_reject_unknown_field() {
        let yaml = "monthly_fee: \"100\"\nturbo: \"5\"\n";
        let result: Result<VehicleCostComponents, _> = serde_yaml::from_str(yaml);
        assert!(result.is_err());
    }

    #[test]
    fn test_resource_line_tagged_by_kind() {
        let yaml = r#"
kind: expense
id: exp_rent
branch: administrative
monthly_amount: "12000000"
assignment:
  mode: shared
  criterion: equal_split
"#;
        let line: ResourceLine = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(line.kind(), LineKind::Expense);
        assert_eq!(line.id(), "exp_rent");
        assert_eq!(line.branch(), Branch::Administrative);
        assert!(line.assignment().is_shared());
    }

    #[test]
    fn test_staffing_validate_rejects_zero_quantity() {
        match staffing(0, "1000").validate() {
            Err(EngineError::InvalidInput { entity, message }) => {
                assert_eq!(entity, "stf_reps");
                assert!(message.contains("quantity"));
            }
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_staffing_validate_rejects_negative_salary() {
        assert!(matches!(
            staffing(1, "-1").validate(),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_expense_must_be_shared() {
        let line = ExpenseLine {
            id: "exp_x".to_string(),
            branch: Branch::Administrative,
            description: String::new(),
            monthly_amount: dec("10"),
            assignment: Assignment::Individual {
                brand_id: "alpha".to_string(),
            },
        };
        assert!(matches!(line.validate(), Err(EngineError::InvalidInput { .. })));
    }

    #[test]
    fn test_empty_dedication_map_is_mismatch() {
        let mut line = staffing(1, "1000");
        line.assignment = Assignment::Shared(SharedAssignment {
            criterion: AllocationCriterion::EqualSplit,
            eligible_brands: vec![],
            dedication: Some(BTreeMap::new()),
        });
        assert!(matches!(
            line.validate(),
            Err(EngineError::DedicationMismatch { .. })
        ));
    }

    #[test]
    fn test_serves_checks_eligibility() {
        let shared = Assignment::Shared(SharedAssignment {
            criterion: AllocationCriterion::EqualSplit,
            eligible_brands: vec!["alpha".to_string()],
            dedication: None,
        });
        assert!(shared.serves("alpha"));
        assert!(!shared.serves("beta"));

        let everyone = Assignment::Shared(SharedAssignment {
            criterion: AllocationCriterion::EqualSplit,
            eligible_brands: vec![],
            dedication: None,
        });
        assert!(everyone.serves("beta"));
    }

    #[test]
    fn test_scheme_component_sets() {
        assert_eq!(VehicleScheme::Owned.components().len(), 5);
        assert_eq!(VehicleScheme::Leased.components().len(), 4);
        assert_eq!(
            VehicleScheme::ThirdParty.components(),
            &[VehicleComponent::ContractedRate]
        );
        assert_eq!(
            VehicleScheme::Leased.required_component(),
            Some(VehicleComponent::MonthlyFee)
        );
    }
}
