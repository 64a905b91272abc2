//! The simulation orchestrator.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{BranchAggregator, BranchTotals, percent_of};
use crate::error::{DataProviderError, EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, BenefitFactorTable, Branch, Brand, BrandId, BrandResult,
    BrandUniverse, ConsolidatedResult, ResourceLine, SimulationResult, SimulationRun,
};
use crate::provider::DataProvider;

use super::SimulationState;

/// The rule identifier recorded on per-brand margin audit steps.
pub const BRAND_MARGIN_RULE_ID: &str = "brand_margin";

/// Inputs fetched once at `DATA_LOADED` and read for the rest of the run.
#[derive(Debug)]
struct Snapshot {
    universe: BrandUniverse,
    requested: Vec<Brand>,
    factors: BenefitFactorTable,
    lines: Vec<ResourceLine>,
}

/// Runs one simulation over a [`DataProvider`].
///
/// A simulator is single-use: it walks `INITIALIZED → DATA_LOADED →
/// CALCULATED → AGGREGATED → DONE` once, or stops at `FAILED` on the first
/// error. Calling a step out of order yields [`EngineError::InvalidState`].
/// Independent runs, including concurrent ones, each need their own
/// simulator.
///
/// # Example
///
/// ```no_run
/// use cost_simulator::config::ConfigLoader;
/// use cost_simulator::provider::InMemoryDataProvider;
/// use cost_simulator::simulation::{SimulationState, Simulator};
///
/// let scenario = ConfigLoader::load("./config/scenarios/base_2025")?.into_scenario();
/// let provider = InMemoryDataProvider::from_scenarios([scenario])?;
///
/// let mut simulator = Simulator::new(&provider, "base_2025", vec!["alpha".to_string()]);
/// simulator.load_data()?;
/// simulator.calculate()?;
/// simulator.aggregate()?;
/// let run = simulator.finish()?;
/// assert_eq!(simulator.state(), SimulationState::Done);
/// println!("alpha margin: {:?}", run.result.brand("alpha").and_then(|b| b.margin_pct));
/// # Ok::<(), cost_simulator::error::EngineError>(())
/// ```
pub struct Simulator<'a> {
    provider: &'a dyn DataProvider,
    scenario_id: String,
    brand_ids: Vec<BrandId>,
    state: SimulationState,
    run_id: Uuid,
    started_at: DateTime<Utc>,
    timer: Instant,
    step_number: u32,
    audit_steps: Vec<AuditStep>,
    snapshot: Option<Snapshot>,
    branch_totals: Vec<BranchTotals>,
    result: Option<SimulationResult>,
}

impl<'a> Simulator<'a> {
    /// Creates a simulator for `brand_ids` within `scenario_id`.
    pub fn new(
        provider: &'a dyn DataProvider,
        scenario_id: impl Into<String>,
        brand_ids: Vec<BrandId>,
    ) -> Self {
        Self {
            provider,
            scenario_id: scenario_id.into(),
            brand_ids,
            state: SimulationState::Initialized,
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            timer: Instant::now(),
            step_number: 1,
            audit_steps: Vec::new(),
            snapshot: None,
            branch_totals: Vec::new(),
            result: None,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// The identifier of this run.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Fetches brands, factors, and lines from the provider.
    ///
    /// The full brand universe is fetched so shared lines are apportioned
    /// over every eligible brand, not just the requested subset.
    pub fn load_data(&mut self) -> EngineResult<()> {
        self.expect_state(SimulationState::Initialized)?;
        info!(
            run_id = %self.run_id,
            scenario_id = %self.scenario_id,
            brand_count = self.brand_ids.len(),
            "Starting simulation"
        );
        let outcome = self.fetch_snapshot();
        self.settle(outcome, SimulationState::DataLoaded)
    }

    /// Runs the commercial, logistics, and administrative aggregators.
    pub fn calculate(&mut self) -> EngineResult<()> {
        self.expect_state(SimulationState::DataLoaded)?;
        let outcome = self.aggregate_branches();
        self.settle(outcome, SimulationState::Calculated)
    }

    /// Computes per-brand totals, margins, and the consolidated block.
    ///
    /// Brands with zero sales get null percentages and a `ZERO_SALES`
    /// warning; they never fail the run.
    pub fn aggregate(&mut self) -> EngineResult<()> {
        self.expect_state(SimulationState::Calculated)?;
        let outcome = self.build_result();
        self.settle(outcome, SimulationState::Aggregated)
    }

    /// Hands out the result together with run metadata and the audit trace.
    pub fn finish(&mut self) -> EngineResult<SimulationRun> {
        self.expect_state(SimulationState::Aggregated)?;
        let result = match self.result.take() {
            Some(result) => result,
            None => {
                let err = EngineError::CalculationError {
                    message: "aggregated simulator holds no result".to_string(),
                };
                return Err(self.fail(err));
            }
        };

        let duration_us = self.timer.elapsed().as_micros() as u64;
        info!(
            run_id = %self.run_id,
            scenario_id = %self.scenario_id,
            brand_count = result.consolidated.brand_count,
            sales = %result.consolidated.sales,
            cost_total = %result.consolidated.cost_total,
            warnings = result.warnings.len(),
            duration_us,
            "Simulation completed"
        );

        self.state = SimulationState::Done;
        Ok(SimulationRun {
            run_id: self.run_id,
            started_at: self.started_at,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            audit_trace: AuditTrace {
                steps: std::mem::take(&mut self.audit_steps),
                warnings: result.warnings.clone(),
                duration_us,
            },
            result,
        })
    }

    /// Runs every step in order.
    pub fn run(mut self) -> EngineResult<SimulationRun> {
        self.load_data()?;
        self.calculate()?;
        self.aggregate()?;
        self.finish()
    }

    fn expect_state(&self, expected: SimulationState) -> EngineResult<()> {
        if self.state != expected {
            return Err(EngineError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    fn settle(&mut self, outcome: EngineResult<()>, next: SimulationState) -> EngineResult<()> {
        match outcome {
            Ok(()) => {
                self.state = next;
                Ok(())
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn fail(&mut self, err: EngineError) -> EngineError {
        warn!(
            run_id = %self.run_id,
            scenario_id = %self.scenario_id,
            state = %self.state,
            kind = err.kind(),
            entity = err.entity().unwrap_or("-"),
            error = %err,
            "Simulation failed"
        );
        self.state = SimulationState::Failed;
        self.snapshot = None;
        self.branch_totals.clear();
        self.result = None;
        err
    }

    fn fetch_snapshot(&mut self) -> EngineResult<()> {
        if self.brand_ids.is_empty() {
            return Err(EngineError::invalid_input(
                &self.scenario_id,
                "at least one brand must be requested",
            ));
        }
        let mut seen = BTreeSet::new();
        for id in &self.brand_ids {
            if !seen.insert(id.as_str()) {
                return Err(EngineError::invalid_input(id, "brand requested more than once"));
            }
        }

        let provider = self.provider;
        let scenario_id = self.scenario_id.as_str();

        let factors = provider.get_benefit_factors(scenario_id)?;
        factors.validate()?;

        let all_ids = provider.get_all_brand_ids(scenario_id)?;
        let all_brands = provider.get_brands(scenario_id, &all_ids)?;
        for brand in &all_brands {
            brand.validate()?;
        }
        let universe = BrandUniverse::new(all_brands)?;

        let requested = self
            .brand_ids
            .iter()
            .map(|id| {
                universe.get(id).cloned().ok_or_else(|| {
                    EngineError::from(DataProviderError::BrandNotFound {
                        scenario_id: scenario_id.to_string(),
                        brand_id: id.clone(),
                    })
                })
            })
            .collect::<EngineResult<Vec<Brand>>>()?;

        let mut lines: Vec<ResourceLine> = Vec::new();
        lines.extend(
            provider
                .get_staffing_lines(scenario_id, &self.brand_ids)?
                .into_iter()
                .map(ResourceLine::from),
        );
        lines.extend(
            provider
                .get_vehicle_lines(scenario_id, &self.brand_ids)?
                .into_iter()
                .map(ResourceLine::from),
        );
        lines.extend(
            provider
                .get_shared_expense_lines(scenario_id)?
                .into_iter()
                .map(ResourceLine::from),
        );

        let mut line_ids = BTreeSet::new();
        let mut relevant = Vec::with_capacity(lines.len());
        for line in lines {
            line.validate()?;
            if !line_ids.insert(line.id().to_string()) {
                return Err(EngineError::invalid_input(line.id(), "duplicate line id"));
            }
            let assignment = line.assignment();
            if self.brand_ids.iter().any(|id| assignment.serves(id)) {
                relevant.push(line);
            }
        }

        debug!(
            run_id = %self.run_id,
            universe = universe.len(),
            requested = requested.len(),
            lines = relevant.len(),
            "Loaded scenario data"
        );

        self.snapshot = Some(Snapshot {
            universe,
            requested,
            factors,
            lines: relevant,
        });
        Ok(())
    }

    fn aggregate_branches(&mut self) -> EngineResult<()> {
        let snapshot = self.snapshot.as_ref().ok_or_else(|| EngineError::CalculationError {
            message: "no data loaded".to_string(),
        })?;

        let mut all_totals = Vec::with_capacity(Branch::ALL.len());
        let mut step_number = self.step_number;
        let mut steps = Vec::new();

        for branch in Branch::ALL {
            let (shared, individual): (Vec<&ResourceLine>, Vec<&ResourceLine>) = snapshot
                .lines
                .iter()
                .filter(|line| line.branch() == branch)
                .partition(|line| line.assignment().is_shared());

            let totals = BranchAggregator::new(branch).aggregate(
                &individual,
                &shared,
                &snapshot.universe,
                &snapshot.factors,
                step_number,
            )?;
            step_number += totals.audit_steps.len() as u32;
            steps.extend(totals.audit_steps.iter().cloned());
            all_totals.push(totals);
        }

        self.step_number = step_number;
        self.audit_steps.extend(steps);
        self.branch_totals = all_totals;
        Ok(())
    }

    fn build_result(&mut self) -> EngineResult<()> {
        let snapshot = self.snapshot.as_ref().ok_or_else(|| EngineError::CalculationError {
            message: "no data loaded".to_string(),
        })?;

        let mut brands = BTreeMap::new();
        let mut warnings = Vec::new();
        let mut step_number = self.step_number;
        let mut steps = Vec::new();

        let mut requested: Vec<&Brand> = snapshot.requested.iter().collect();
        requested.sort_by(|a, b| a.id.cmp(&b.id));

        for brand in requested {
            let branch_cost = |branch: Branch| {
                self.branch_totals
                    .iter()
                    .find(|t| t.branch == branch)
                    .map(|t| t.brand(&brand.id))
                    .unwrap_or_default()
            };
            let commercial = branch_cost(Branch::Commercial);
            let logistics = branch_cost(Branch::Logistics);
            let admin = branch_cost(Branch::Administrative);

            let sales = brand.metrics.sales;
            let cost_total = commercial.total + logistics.total + admin.total;
            let shared_cost = commercial.shared + logistics.shared + admin.shared;
            let margin_pct = percent_of(sales - cost_total, sales);
            let cost_pct = percent_of(cost_total, sales);

            if sales.is_zero() {
                let err = EngineError::ZeroSales {
                    brand_id: brand.id.clone(),
                };
                warn!(run_id = %self.run_id, brand_id = %brand.id, "{}", err);
                warnings.push(AuditWarning {
                    code: err.kind().to_string(),
                    message: err.to_string(),
                    severity: "medium".to_string(),
                    subject: brand.id.clone(),
                });
            }

            let result = BrandResult {
                brand_id: brand.id.clone(),
                name: brand.name.clone(),
                sales,
                cost_commercial: commercial.total,
                cost_logistics: logistics.total,
                cost_admin: admin.total,
                cost_total,
                shared_cost,
                margin_pct,
                cost_pct,
            };
            steps.push(margin_audit_step(&result, step_number));
            step_number += 1;
            brands.insert(brand.id.clone(), result);
        }

        let consolidated = consolidate(&brands);
        let shared_allocations = self
            .branch_totals
            .iter()
            .flat_map(|t| t.shared_allocations.iter().cloned())
            .collect();

        self.step_number = step_number;
        self.audit_steps.extend(steps);
        self.result = Some(SimulationResult {
            scenario_id: self.scenario_id.clone(),
            brands,
            consolidated,
            shared_allocations,
            warnings,
        });
        Ok(())
    }
}

fn consolidate(brands: &BTreeMap<BrandId, BrandResult>) -> ConsolidatedResult {
    let sum = |f: fn(&BrandResult) -> Decimal| brands.values().map(f).sum::<Decimal>();

    let sales = sum(|b| b.sales);
    let cost_total = sum(|b| b.cost_total);
    ConsolidatedResult {
        brand_count: brands.len(),
        sales,
        cost_commercial: sum(|b| b.cost_commercial),
        cost_logistics: sum(|b| b.cost_logistics),
        cost_admin: sum(|b| b.cost_admin),
        cost_total,
        shared_cost: sum(|b| b.shared_cost),
        margin_pct: percent_of(sales - cost_total, sales),
        cost_pct: percent_of(cost_total, sales),
    }
}

fn margin_audit_step(result: &BrandResult, step_number: u32) -> AuditStep {
    let pct = |value: Option<Decimal>| value.map(|v| v.normalize().to_string());
    let reasoning = match result.margin_pct {
        Some(margin) => format!(
            "Sales ${} - cost ${} = margin {}%",
            result.sales.normalize(),
            result.cost_total.normalize(),
            margin.normalize()
        ),
        None => format!(
            "Sales are zero; margin for cost ${} is undefined",
            result.cost_total.normalize()
        ),
    };

    AuditStep {
        step_number,
        rule_id: BRAND_MARGIN_RULE_ID.to_string(),
        rule_name: "Brand Margin".to_string(),
        subject: result.brand_id.clone(),
        input: serde_json::json!({
            "sales": result.sales.normalize().to_string(),
            "cost_commercial": result.cost_commercial.normalize().to_string(),
            "cost_logistics": result.cost_logistics.normalize().to_string(),
            "cost_admin": result.cost_admin.normalize().to_string()
        }),
        output: serde_json::json!({
            "cost_total": result.cost_total.normalize().to_string(),
            "shared_cost": result.shared_cost.normalize().to_string(),
            "margin_pct": pct(result.margin_pct),
            "cost_pct": pct(result.cost_pct)
        }),
        reasoning,
    }
}

/// Runs a complete simulation and returns its deterministic result.
///
/// This is the sole convenience entry point; use [`Simulator`] directly to
/// get run metadata and the audit trace.
///
/// # Example
///
/// ```no_run
/// use cost_simulator::config::ConfigLoader;
/// use cost_simulator::provider::InMemoryDataProvider;
/// use cost_simulator::simulation::run_simulation;
///
/// let scenarios = ConfigLoader::load_all("./config/scenarios")?;
/// let provider = InMemoryDataProvider::from_scenarios(scenarios)?;
/// let result = run_simulation(
///     &provider,
///     "base_2025",
///     &["alpha".to_string(), "beta".to_string()],
/// )?;
/// println!("{}", result.to_flat_json());
/// # Ok::<(), cost_simulator::error::EngineError>(())
/// ```
pub fn run_simulation(
    provider: &dyn DataProvider,
    scenario_id: &str,
    brand_ids: &[BrandId],
) -> EngineResult<SimulationResult> {
    Simulator::new(provider, scenario_id, brand_ids.to_vec())
        .run()
        .map(|run| run.result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::{
        Assignment, ExpenseLine, StaffingLine, VehicleCostComponents, VehicleLine, VehicleScheme,
    };
    use crate::provider::{InMemoryDataProvider, ProviderResult, ScenarioData};
    use std::str::FromStr;

    const SCENARIO: &str = "base_2025";

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ids(items: &[&str]) -> Vec<BrandId> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn create_test_scenario() -> ScenarioData {
        ConfigLoader::load("./config/scenarios/base_2025")
            .unwrap()
            .into_scenario()
    }

    fn create_test_provider() -> InMemoryDataProvider {
        InMemoryDataProvider::from_scenarios([create_test_scenario()]).unwrap()
    }

    /// A single brand with 150M sales and one 18.5M logistics contract.
    fn create_margin_provider() -> InMemoryDataProvider {
        let mut scenario = create_test_scenario();
        scenario.brands.retain(|b| b.id == "alpha");
        scenario.staffing_lines.clear();
        scenario.expense_lines.clear();
        scenario.vehicle_lines = vec![VehicleLine {
            id: "veh_contract".to_string(),
            branch: Branch::Logistics,
            description: "Outsourced fleet".to_string(),
            scheme: VehicleScheme::ThirdParty,
            quantity: 1,
            components: VehicleCostComponents {
                contracted_rate: Some(dec("18500000")),
                ..VehicleCostComponents::default()
            },
            assignment: Assignment::Individual {
                brand_id: "alpha".to_string(),
            },
        }];
        InMemoryDataProvider::from_scenarios([scenario]).unwrap()
    }

    struct UnavailableProvider;

    impl DataProvider for UnavailableProvider {
        fn get_brands(&self, _: &str, _: &[BrandId]) -> ProviderResult<Vec<Brand>> {
            Err(self.error())
        }
        fn get_all_brand_ids(&self, _: &str) -> ProviderResult<Vec<BrandId>> {
            Err(self.error())
        }
        fn get_benefit_factors(&self, _: &str) -> ProviderResult<BenefitFactorTable> {
            Err(self.error())
        }
        fn get_staffing_lines(&self, _: &str, _: &[BrandId]) -> ProviderResult<Vec<StaffingLine>> {
            Err(self.error())
        }
        fn get_vehicle_lines(&self, _: &str, _: &[BrandId]) -> ProviderResult<Vec<VehicleLine>> {
            Err(self.error())
        }
        fn get_shared_expense_lines(&self, _: &str) -> ProviderResult<Vec<ExpenseLine>> {
            Err(self.error())
        }
    }

    impl UnavailableProvider {
        fn error(&self) -> DataProviderError {
            DataProviderError::Unavailable {
                message: "connection refused".to_string(),
            }
        }
    }

    #[test]
    fn test_margin_scenario() {
        let provider = create_margin_provider();
        let result = run_simulation(&provider, SCENARIO, &ids(&["alpha"])).unwrap();

        let alpha = result.brand("alpha").unwrap();
        assert_eq!(alpha.cost_total, dec("18500000"));
        assert_eq!(alpha.cost_logistics, dec("18500000"));
        assert_eq!(alpha.margin_pct, Some(dec("87.67")));
        assert_eq!(alpha.cost_pct, Some(dec("12.33")));
    }

    #[test]
    fn test_state_machine_walks_every_state() {
        let provider = create_test_provider();
        let mut simulator = Simulator::new(&provider, SCENARIO, ids(&["alpha"]));
        assert_eq!(simulator.state(), SimulationState::Initialized);

        simulator.load_data().unwrap();
        assert_eq!(simulator.state(), SimulationState::DataLoaded);
        simulator.calculate().unwrap();
        assert_eq!(simulator.state(), SimulationState::Calculated);
        simulator.aggregate().unwrap();
        assert_eq!(simulator.state(), SimulationState::Aggregated);
        let run = simulator.finish().unwrap();
        assert_eq!(simulator.state(), SimulationState::Done);

        assert_eq!(run.run_id, simulator.run_id());
        assert_eq!(run.engine_version, env!("CARGO_PKG_VERSION"));
        assert!(!run.audit_trace.steps.is_empty());
    }

    #[test]
    fn test_out_of_order_call_is_invalid_state() {
        let provider = create_test_provider();
        let mut simulator = Simulator::new(&provider, SCENARIO, ids(&["alpha"]));

        match simulator.aggregate() {
            Err(EngineError::InvalidState { expected, actual }) => {
                assert_eq!(expected, SimulationState::Calculated);
                assert_eq!(actual, SimulationState::Initialized);
            }
            other => panic!("Expected InvalidState, got {:?}", other),
        }
        // An out-of-order call does not poison the simulator.
        assert_eq!(simulator.state(), SimulationState::Initialized);
    }

    #[test]
    fn test_finished_simulator_cannot_rerun() {
        let provider = create_test_provider();
        let mut simulator = Simulator::new(&provider, SCENARIO, ids(&["alpha"]));
        simulator.load_data().unwrap();
        simulator.calculate().unwrap();
        simulator.aggregate().unwrap();
        simulator.finish().unwrap();

        assert!(matches!(
            simulator.load_data(),
            Err(EngineError::InvalidState {
                actual: SimulationState::Done,
                ..
            })
        ));
    }

    #[test]
    fn test_provider_error_is_propagated_and_fails_run() {
        let provider = UnavailableProvider;
        let mut simulator = Simulator::new(&provider, SCENARIO, ids(&["alpha"]));

        match simulator.load_data() {
            Err(EngineError::DataProvider(DataProviderError::Unavailable { message })) => {
                assert_eq!(message, "connection refused");
            }
            other => panic!("Expected DataProvider error, got {:?}", other),
        }
        assert_eq!(simulator.state(), SimulationState::Failed);
        assert!(matches!(
            simulator.calculate(),
            Err(EngineError::InvalidState {
                actual: SimulationState::Failed,
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_brand_is_provider_error() {
        let provider = create_test_provider();
        let result = run_simulation(&provider, SCENARIO, &ids(&["omega"]));
        assert!(matches!(
            result,
            Err(EngineError::DataProvider(DataProviderError::BrandNotFound { .. }))
        ));
    }

    #[test]
    fn test_empty_and_duplicate_brand_requests_are_invalid() {
        let provider = create_test_provider();
        assert!(matches!(
            run_simulation(&provider, SCENARIO, &[]),
            Err(EngineError::InvalidInput { .. })
        ));
        assert!(matches!(
            run_simulation(&provider, SCENARIO, &ids(&["alpha", "alpha"])),
            Err(EngineError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_calculation_failure_moves_to_failed() {
        let mut scenario = create_test_scenario();
        for brand in &mut scenario.brands {
            brand.metrics.usage_units = Decimal::ZERO;
        }
        let provider = InMemoryDataProvider::from_scenarios([scenario]).unwrap();

        let mut simulator = Simulator::new(&provider, SCENARIO, ids(&["alpha"]));
        simulator.load_data().unwrap();
        match simulator.calculate() {
            Err(EngineError::DivisionBasisZero { line_id, .. }) => {
                assert_eq!(line_id.as_deref(), Some("exp_software"));
            }
            other => panic!("Expected DivisionBasisZero, got {:?}", other),
        }
        assert_eq!(simulator.state(), SimulationState::Failed);
    }

    #[test]
    fn test_zero_sales_is_a_warning_not_a_failure() {
        let mut scenario = create_test_scenario();
        for brand in &mut scenario.brands {
            if brand.id == "gamma" {
                brand.metrics.sales = Decimal::ZERO;
            }
        }
        let provider = InMemoryDataProvider::from_scenarios([scenario]).unwrap();

        let result = run_simulation(&provider, SCENARIO, &ids(&["alpha", "gamma"])).unwrap();
        let gamma = result.brand("gamma").unwrap();
        assert!(gamma.margin_pct.is_none());
        assert!(gamma.cost_pct.is_none());
        assert!(gamma.cost_total > Decimal::ZERO);
        assert!(result.brand("alpha").unwrap().margin_pct.is_some());

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, "ZERO_SALES");
        assert_eq!(result.warnings[0].subject, "gamma");
    }

    #[test]
    fn test_subset_uses_full_universe_for_shared_lines() {
        let provider = create_test_provider();
        let alone = run_simulation(&provider, SCENARIO, &ids(&["alpha"])).unwrap();
        let together =
            run_simulation(&provider, SCENARIO, &ids(&["alpha", "beta", "gamma"])).unwrap();

        assert_eq!(alone.brand("alpha"), together.brand("alpha"));

        let rent = alone
            .shared_allocations
            .iter()
            .find(|a| a.line_id == "exp_warehouse_rent")
            .unwrap();
        assert_eq!(rent.shares.len(), 3);
        assert_eq!(rent.shares["alpha"], dec("4000000"));
    }

    #[test]
    fn test_non_requested_individual_lines_are_skipped() {
        let provider = create_test_provider();
        let run = Simulator::new(&provider, SCENARIO, ids(&["alpha"]))
            .run()
            .unwrap();

        assert_eq!(run.result.brands.len(), 1);
        assert!(run.result.brand("beta").is_none());
        assert!(run.audit_trace.steps.iter().all(|s| s.subject != "stf_rep_beta"));
        assert!(run.audit_trace.steps.iter().any(|s| s.subject == "stf_rep_alpha"));
    }

    #[test]
    fn test_audit_steps_numbered_consecutively() {
        let provider = create_test_provider();
        let run = Simulator::new(&provider, SCENARIO, ids(&["alpha", "beta"]))
            .run()
            .unwrap();

        for (index, step) in run.audit_trace.steps.iter().enumerate() {
            assert_eq!(step.step_number, index as u32 + 1);
        }
        let margins = run
            .audit_trace
            .steps
            .iter()
            .filter(|s| s.rule_id == BRAND_MARGIN_RULE_ID)
            .count();
        assert_eq!(margins, 2);
    }
}
