//! Calculation logic for the cost simulator.
//!
//! This module contains the pure cost functions: payroll cost with statutory
//! benefit factors, vehicle cost per ownership scheme, expense cost, the
//! largest-remainder allocator for shared lines, and the per-branch
//! aggregator that combines them.

mod allocation;
mod branch_aggregator;
mod expense;
mod payroll;
mod rounding;
mod vehicle;

pub use allocation::{allocate, dedication_tolerance};
pub use branch_aggregator::{
    BranchAggregator, BranchTotals, BrandBranchCost, LineCost, SHARED_ALLOCATION_RULE_ID,
    calculate_line_cost,
};
pub use expense::{EXPENSE_RULE_ID, ExpenseCost, calculate_expense_cost};
pub use payroll::{PAYROLL_RULE_ID, PayrollCost, calculate_payroll_cost};
pub use rounding::{
    MONEY_DECIMAL_PLACES, PERCENT_DECIMAL_PLACES, floor_money, is_minor_unit_precise, minor_unit,
    percent_of, round_money,
};
pub use vehicle::{VEHICLE_RULE_ID, VehicleCost, calculate_vehicle_cost};
