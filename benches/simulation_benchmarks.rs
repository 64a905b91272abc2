//! Performance benchmarks for the cost simulator.
//!
//! This benchmark suite covers:
//! - A single payroll line calculation
//! - Allocating one shared amount across growing brand counts
//! - A full simulation of the fixture scenario
//! - A batch of 100 simulations over the same provider
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::collections::BTreeMap;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;

use cost_simulator::calculation::{allocate, calculate_payroll_cost};
use cost_simulator::config::ConfigLoader;
use cost_simulator::models::{
    AllocationCriterion, Allowance, Assignment, BenefitFactorTable, BenefitFactors, Branch, Brand,
    BrandMetrics, StaffingLine, TransportSubsidyRule,
};
use cost_simulator::provider::InMemoryDataProvider;
use cost_simulator::simulation::run_simulation;

/// Creates a provider with the fixture scenario loaded.
fn create_test_provider() -> InMemoryDataProvider {
    let scenarios = ConfigLoader::load_all("./config/scenarios").expect("Failed to load config");
    InMemoryDataProvider::from_scenarios(scenarios).expect("Invalid fixture scenario")
}

/// Creates `count` brands with distinct sales.
fn create_brands(count: usize) -> Vec<Brand> {
    (0..count)
        .map(|i| Brand {
            id: format!("brand_{:04}", i),
            name: format!("Brand {}", i),
            active: true,
            metrics: BrandMetrics {
                sales: Decimal::from(1_000_000 + (i as i64) * 7_919),
                volume: Decimal::from(100 + i as i64),
                headcount: 3,
                usage_units: Decimal::from(10),
            },
        })
        .collect()
}

fn bench_payroll_line(c: &mut Criterion) {
    let mut categories = BTreeMap::new();
    categories.insert(
        "commercial".to_string(),
        BenefitFactors {
            pension: Decimal::new(402, 3),
            ..BenefitFactors::default()
        },
    );
    let table = BenefitFactorTable {
        transport_subsidy: TransportSubsidyRule {
            monthly_amount: Decimal::from(200_000),
            salary_threshold: Decimal::from(2_847_000),
        },
        categories,
    };
    let line = StaffingLine {
        id: "stf_rep".to_string(),
        branch: Branch::Commercial,
        position: "Sales representative".to_string(),
        category: "commercial".to_string(),
        base_salary: Decimal::from(2_150_000),
        quantity: 3,
        transport_subsidy_eligible: true,
        allowances: vec![Allowance {
            name: "data_plan".to_string(),
            amount: Decimal::from(35_000),
            benefit_bearing: false,
        }],
        assignment: Assignment::Individual {
            brand_id: "alpha".to_string(),
        },
    };

    c.bench_function("payroll_line", |b| {
        b.iter(|| black_box(calculate_payroll_cost(black_box(&line), &table, 1).unwrap()))
    });
}

fn bench_allocation_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("allocation_scaling");
    let amount = Decimal::new(123_456_789, 2);

    for brand_count in [3usize, 10, 50, 200] {
        let brands = create_brands(brand_count);
        group.throughput(Throughput::Elements(brand_count as u64));
        group.bench_with_input(
            BenchmarkId::new("brands", brand_count),
            &brands,
            |b, brands| {
                b.iter(|| {
                    black_box(
                        allocate(amount, AllocationCriterion::SalesProportional, brands, None)
                            .unwrap(),
                    )
                })
            },
        );
    }

    group.finish();
}

fn bench_full_simulation(c: &mut Criterion) {
    let provider = create_test_provider();
    let brands: Vec<String> = ["alpha", "beta", "gamma"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    c.bench_function("full_simulation", |b| {
        b.iter(|| black_box(run_simulation(&provider, "base_2025", &brands).unwrap()))
    });
}

fn bench_batch_100(c: &mut Criterion) {
    let provider = create_test_provider();
    let subsets: Vec<Vec<String>> = (0..100)
        .map(|i| match i % 3 {
            0 => vec!["alpha".to_string()],
            1 => vec!["beta".to_string(), "gamma".to_string()],
            _ => vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()],
        })
        .collect();

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(100));

    group.bench_function("batch_100", |b| {
        b.iter(|| {
            let results: Vec<_> = subsets
                .iter()
                .map(|brands| run_simulation(&provider, "base_2025", brands).unwrap())
                .collect();
            black_box(results)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_payroll_line,
    bench_allocation_scaling,
    bench_full_simulation,
    bench_batch_100,
);
criterion_main!(benches);
