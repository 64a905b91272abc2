//! The data-access seam between the simulator and its inputs.
//!
//! The simulator reads everything it needs through a [`DataProvider`]:
//! brands, the benefit factor table, and resource lines. Providers own I/O
//! and retries; the simulator calls each method once per run and works on
//! the fetched snapshot.
//!
//! [`InMemoryDataProvider`] serves [`ScenarioData`] snapshots held in memory,
//! typically loaded from YAML through [`ConfigLoader`](crate::config::ConfigLoader).

mod memory;
mod scenario;

pub use memory::InMemoryDataProvider;
pub use scenario::ScenarioData;

use crate::error::DataProviderError;
use crate::models::{BenefitFactorTable, Brand, BrandId, ExpenseLine, StaffingLine, VehicleLine};

/// Result type for data provider calls.
pub type ProviderResult<T> = Result<T, DataProviderError>;

/// Source of scenario inputs.
///
/// Implementations must return a consistent snapshot for the duration of a
/// run: the simulator never re-fetches mid-calculation.
pub trait DataProvider {
    /// Returns the requested brands, in request order.
    ///
    /// Fails with [`DataProviderError::BrandNotFound`] if any id is unknown.
    fn get_brands(&self, scenario_id: &str, ids: &[BrandId]) -> ProviderResult<Vec<Brand>>;

    /// Returns the id of every brand in the scenario, active or not.
    fn get_all_brand_ids(&self, scenario_id: &str) -> ProviderResult<Vec<BrandId>>;

    /// Returns the scenario's statutory factor table.
    fn get_benefit_factors(&self, scenario_id: &str) -> ProviderResult<BenefitFactorTable>;

    /// Returns staffing lines bound to, or shared with, any of `brand_ids`.
    fn get_staffing_lines(
        &self,
        scenario_id: &str,
        brand_ids: &[BrandId],
    ) -> ProviderResult<Vec<StaffingLine>>;

    /// Returns vehicle lines bound to, or shared with, any of `brand_ids`.
    fn get_vehicle_lines(
        &self,
        scenario_id: &str,
        brand_ids: &[BrandId],
    ) -> ProviderResult<Vec<VehicleLine>>;

    /// Returns every shared expense line of the scenario.
    fn get_shared_expense_lines(&self, scenario_id: &str) -> ProviderResult<Vec<ExpenseLine>>;
}
