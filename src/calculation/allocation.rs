//! Shared-cost apportionment across brands.
//!
//! This module distributes an amount across eligible brands by one of the
//! [`AllocationCriterion`] bases, or by explicit dedication weights. Shares
//! always sum to the input amount exactly: exact fractional shares are
//! floored to the minor unit and the residual minor units go to the brands
//! with the largest fractional remainders, ties broken by brand id.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ALLOCATION_ENTITY, EngineError, EngineResult, dedication_sum_message};
use crate::models::{AllocationCriterion, Brand, BrandId};

use super::rounding::{floor_money, is_minor_unit_precise, minor_unit};

/// Allowed deviation of dedication weights from 100% (±0.01%).
pub fn dedication_tolerance() -> Decimal {
    Decimal::new(1, 4)
}

/// Distributes `amount` across `brands`.
///
/// Explicit `dedication` weights, when supplied, always take precedence over
/// the criterion's computed basis. A single eligible brand receives the full
/// amount regardless of criterion.
///
/// # Errors
///
/// - `NoEligibleBrands` when `brands` is empty.
/// - `DedicationMismatch` when dedication weights name a brand outside
///   `brands`, fall outside `[0, 1]`, or do not sum to 100% ± 0.01%.
/// - `DivisionBasisZero` when the criterion's basis sums to zero.
/// - `InvalidInput` for a negative amount, an amount below minor-unit
///   precision, duplicate brands, or a negative basis metric.
///
/// # Examples
///
/// ```
/// use cost_simulator::calculation::allocate;
/// use cost_simulator::models::{AllocationCriterion, Brand, BrandMetrics};
/// use rust_decimal::Decimal;
///
/// let brand = |id: &str, sales: i64| Brand {
///     id: id.to_string(),
///     name: id.to_string(),
///     active: true,
///     metrics: BrandMetrics { sales: Decimal::from(sales), ..BrandMetrics::default() },
/// };
/// let brands = vec![brand("a", 150_000_000), brand("b", 90_000_000), brand("c", 60_000_000)];
///
/// let shares = allocate(
///     Decimal::from(8_000_000),
///     AllocationCriterion::SalesProportional,
///     &brands,
///     None,
/// )
/// .unwrap();
/// assert_eq!(shares["a"], Decimal::from(4_000_000));
/// assert_eq!(shares["b"], Decimal::from(2_400_000));
/// assert_eq!(shares["c"], Decimal::from(1_600_000));
/// ```
pub fn allocate(
    amount: Decimal,
    criterion: AllocationCriterion,
    brands: &[Brand],
    dedication: Option<&BTreeMap<BrandId, Decimal>>,
) -> EngineResult<BTreeMap<BrandId, Decimal>> {
    if amount < Decimal::ZERO {
        return Err(EngineError::invalid_input(
            ALLOCATION_ENTITY,
            format!("amount to allocate must not be negative, got {}", amount),
        ));
    }
    if !is_minor_unit_precise(amount) {
        return Err(EngineError::invalid_input(
            ALLOCATION_ENTITY,
            format!("amount {} has digits below the currency minor unit", amount),
        ));
    }
    if brands.is_empty() {
        return Err(EngineError::NoEligibleBrands { line_id: None });
    }

    let mut seen = BTreeSet::new();
    for brand in brands {
        if !seen.insert(brand.id.as_str()) {
            return Err(EngineError::invalid_input(
                ALLOCATION_ENTITY,
                format!("brand '{}' listed more than once", brand.id),
            ));
        }
    }

    let dedication_weights = match dedication {
        Some(weights) => Some(dedication_weights(weights, brands)?),
        None => None,
    };

    if brands.len() == 1 {
        let mut shares = BTreeMap::new();
        shares.insert(brands[0].id.clone(), amount);
        return Ok(shares);
    }

    let weights = match dedication_weights {
        Some(weights) => weights,
        None => criterion_weights(criterion, brands)?,
    };

    distribute_largest_remainder(amount, &weights)
}

/// Validates dedication weights and expands them over every eligible brand.
fn dedication_weights<'a>(
    dedication: &BTreeMap<BrandId, Decimal>,
    brands: &'a [Brand],
) -> EngineResult<Vec<(&'a str, Decimal)>> {
    for (brand_id, weight) in dedication {
        if !brands.iter().any(|b| &b.id == brand_id) {
            return Err(EngineError::DedicationMismatch {
                message: format!("brand '{}' is not eligible for this line", brand_id),
                line_id: None,
            });
        }
        if *weight < Decimal::ZERO || *weight > Decimal::ONE {
            return Err(EngineError::DedicationMismatch {
                message: format!("weight for '{}' must be within [0, 1], got {}", brand_id, weight),
                line_id: None,
            });
        }
    }

    let total: Decimal = dedication.values().copied().sum();
    if (total - Decimal::ONE).abs() > dedication_tolerance() {
        return Err(EngineError::DedicationMismatch {
            message: dedication_sum_message(total),
            line_id: None,
        });
    }

    Ok(brands
        .iter()
        .map(|b| {
            (
                b.id.as_str(),
                dedication.get(&b.id).copied().unwrap_or(Decimal::ZERO),
            )
        })
        .collect())
}

/// Computes per-brand weights from the criterion's basis metric.
fn criterion_weights(
    criterion: AllocationCriterion,
    brands: &[Brand],
) -> EngineResult<Vec<(&str, Decimal)>> {
    let mut weights = Vec::with_capacity(brands.len());
    for brand in brands {
        let weight = match brand.metrics.basis(criterion) {
            Some(basis) if basis < Decimal::ZERO => {
                return Err(EngineError::invalid_input(
                    &brand.id,
                    format!("basis for '{}' must not be negative, got {}", criterion, basis),
                ));
            }
            Some(basis) => basis,
            None => Decimal::ONE,
        };
        weights.push((brand.id.as_str(), weight));
    }

    let total: Decimal = weights.iter().map(|(_, w)| *w).sum();
    if total.is_zero() {
        return Err(EngineError::DivisionBasisZero {
            criterion,
            line_id: None,
        });
    }
    Ok(weights)
}

struct ShareEntry<'a> {
    brand_id: &'a str,
    share: Decimal,
    remainder: Decimal,
}

/// Largest-remainder distribution of `amount` by `weights`.
fn distribute_largest_remainder(
    amount: Decimal,
    weights: &[(&str, Decimal)],
) -> EngineResult<BTreeMap<BrandId, Decimal>> {
    let total: Decimal = weights.iter().map(|(_, w)| *w).sum();
    let overflow = || EngineError::CalculationError {
        message: format!("overflow while apportioning {}", amount),
    };

    let mut entries = Vec::with_capacity(weights.len());
    for &(brand_id, weight) in weights {
        let exact = amount
            .checked_mul(weight)
            .and_then(|v| v.checked_div(total))
            .ok_or_else(overflow)?;
        let share = floor_money(exact);
        entries.push(ShareEntry {
            brand_id,
            share,
            remainder: exact - share,
        });
    }

    let allocated: Decimal = entries.iter().map(|e| e.share).sum();
    let residual_units = ((amount - allocated) / minor_unit())
        .to_usize()
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("allocated {} exceeds amount {}", allocated, amount),
        })?;

    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| {
        entries[b]
            .remainder
            .cmp(&entries[a].remainder)
            .then_with(|| entries[a].brand_id.cmp(entries[b].brand_id))
    });
    for &idx in order.iter().cycle().take(residual_units) {
        entries[idx].share += minor_unit();
    }

    Ok(entries
        .into_iter()
        .map(|e| (e.brand_id.to_string(), e.share))
        .collect())
}
