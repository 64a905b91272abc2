//! Vehicle cost calculation.
//!
//! This module computes the monthly cost of one vehicle line under its
//! ownership scheme:
//!
//! | Scheme      | Components                                            |
//! |-------------|-------------------------------------------------------|
//! | owned       | depreciation + maintenance + insurance + fuel + taxes |
//! | leased      | monthly_fee + fuel + washing + replacement_reserve    |
//! | third_party | contracted_rate                                       |

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, VehicleComponent, VehicleLine, VehicleScheme};

use super::rounding::round_money;

/// The rule identifier recorded on vehicle audit steps.
pub const VEHICLE_RULE_ID: &str = "vehicle_cost";

/// The result of a vehicle calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct VehicleCost {
    /// The vehicle line this cost belongs to.
    pub line_id: String,
    /// Ownership scheme.
    pub scheme: VehicleScheme,
    /// Number of vehicles.
    pub quantity: u32,
    /// Per-unit value of each component of the scheme.
    pub components: BTreeMap<&'static str, Decimal>,
    /// Monthly cost of one vehicle.
    pub per_unit_cost: Decimal,
    /// Total monthly cost, rounded to the minor unit.
    pub total: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Computes the monthly cost of a vehicle line.
///
/// Quantity multiplies the full per-unit cost.
///
/// # Errors
///
/// - `InconsistentScheme` when a component outside the scheme's set is
///   populated. Third-party lines may carry such fields as zero.
/// - `InvalidInput` when the quantity is zero, a component is negative, no
///   component of the scheme is populated, or the scheme's required
///   component is missing (`monthly_fee` for leased, `contracted_rate` for
///   third party).
///
/// # Examples
///
/// ```
/// use cost_simulator::calculation::calculate_vehicle_cost;
/// use cost_simulator::models::{Assignment, Branch, VehicleCostComponents, VehicleLine, VehicleScheme};
/// use rust_decimal::Decimal;
///
/// let line = VehicleLine {
///     id: "veh_van".to_string(),
///     branch: Branch::Logistics,
///     description: "Leased van".to_string(),
///     scheme: VehicleScheme::Leased,
///     quantity: 1,
///     components: VehicleCostComponents {
///         monthly_fee: Some(Decimal::from(2_800_000)),
///         fuel: Some(Decimal::from(1_200_000)),
///         washing: Some(Decimal::from(80_000)),
///         replacement_reserve: Some(Decimal::from(150_000)),
///         ..VehicleCostComponents::default()
///     },
///     assignment: Assignment::Individual { brand_id: "alpha".to_string() },
/// };
///
/// let cost = calculate_vehicle_cost(&line, 1).unwrap();
/// assert_eq!(cost.total, Decimal::from(4_230_000));
/// ```
pub fn calculate_vehicle_cost(line: &VehicleLine, step_number: u32) -> EngineResult<VehicleCost> {
    line.validate()?;

    let scheme = line.scheme;
    let allowed = scheme.components();

    let mut components = BTreeMap::new();
    for component in VehicleComponent::ALL {
        let Some(value) = line.components.get(component) else {
            continue;
        };
        if value < Decimal::ZERO {
            return Err(EngineError::invalid_input(
                &line.id,
                format!("component '{}' must not be negative, got {}", component.as_str(), value),
            ));
        }
        if !allowed.contains(&component) {
            // Third-party rates are all-inclusive; other fields may be sent as zero.
            if scheme == VehicleScheme::ThirdParty && value.is_zero() {
                continue;
            }
            return Err(EngineError::InconsistentScheme {
                line_id: line.id.clone(),
                scheme,
                field: component.as_str().to_string(),
            });
        }
        components.insert(component.as_str(), value);
    }

    if let Some(required) = scheme.required_component() {
        if line.components.get(required).is_none() {
            return Err(EngineError::invalid_input(
                &line.id,
                format!("scheme '{}' requires '{}'", scheme, required.as_str()),
            ));
        }
    }

    if components.is_empty() {
        return Err(EngineError::invalid_input(
            &line.id,
            format!("scheme '{}' line has no cost components", scheme),
        ));
    }

    let per_unit_cost: Decimal = components.values().copied().sum();
    let total = round_money(per_unit_cost * Decimal::from(line.quantity));

    let itemized = components
        .iter()
        .map(|(name, value)| format!("{} ${}", name, value.normalize()))
        .collect::<Vec<_>>()
        .join(" + ");

    let audit_step = AuditStep {
        step_number,
        rule_id: VEHICLE_RULE_ID.to_string(),
        rule_name: "Vehicle Cost".to_string(),
        subject: line.id.clone(),
        input: serde_json::json!({
            "scheme": scheme.as_str(),
            "quantity": line.quantity,
            "components": components
                .iter()
                .map(|(name, value)| (name.to_string(), value.normalize().to_string()))
                .collect::<BTreeMap<String, String>>()
        }),
        output: serde_json::json!({
            "per_unit_cost": per_unit_cost.normalize().to_string(),
            "total": total.normalize().to_string()
        }),
        reasoning: format!(
            "{} x ({}) = ${}",
            line.quantity,
            if itemized.is_empty() { "no components".to_string() } else { itemized },
            total.normalize()
        ),
    };

    Ok(VehicleCost {
        line_id: line.id.clone(),
        scheme,
        quantity: line.quantity,
        components,
        per_unit_cost,
        total,
        audit_step,
    })
}
