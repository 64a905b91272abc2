//! Monetary rounding helpers.
//!
//! Calculators keep full precision on intermediate values and round once,
//! half-up, at the final summation step.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places of the currency's minor unit.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Number of decimal places kept on reported percentages.
pub const PERCENT_DECIMAL_PLACES: u32 = 2;

/// The smallest representable amount (one minor unit).
pub fn minor_unit() -> Decimal {
    Decimal::new(1, MONEY_DECIMAL_PLACES)
}

/// Rounds an amount half-up to the minor unit.
///
/// # Examples
///
/// ```
/// use cost_simulator::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
/// assert_eq!(round_money(Decimal::from_str("10.004").unwrap()), Decimal::from_str("10.00").unwrap());
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncates an amount down to the minor unit.
pub fn floor_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::ToNegativeInfinity)
}

/// Returns true if the amount has no digits below the minor unit.
pub fn is_minor_unit_precise(value: Decimal) -> bool {
    floor_money(value) == value
}

/// Expresses `part / whole` in percentage points, rounded half-up.
///
/// Returns `None` when `whole` is zero.
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    let ratio = part.checked_div(whole)?;
    Some(
        (ratio * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(PERCENT_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero),
    )
}
