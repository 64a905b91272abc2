//! Core data models for the cost simulator.
//!
//! This module contains all the domain models used throughout the engine.

mod benefit_factors;
mod brand;
mod resource_line;
mod simulation_result;

pub use benefit_factors::{BenefitComponent, BenefitFactorTable, BenefitFactors, TransportSubsidyRule};
pub use brand::{Brand, BrandId, BrandMetrics, BrandUniverse};
pub use resource_line::{
    AllocationCriterion, Allowance, Assignment, Branch, ExpenseLine, LineKind, ResourceLine,
    SharedAssignment, StaffingLine, VehicleComponent, VehicleCostComponents, VehicleLine,
    VehicleScheme,
};
pub use simulation_result::{
    AuditStep, AuditTrace, AuditWarning, BrandResult, ConsolidatedResult,
    FLAT_CONSOLIDATED_KEY, FLAT_SHARED_ALLOCATIONS_KEY, SharedAllocation, SimulationResult,
    SimulationRun,
};
