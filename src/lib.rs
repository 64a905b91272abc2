//! Multi-brand distribution cost simulator
//!
//! This crate computes the monthly cost of brands that share commercial,
//! logistics, and administrative resources: payroll with statutory benefit
//! factors, vehicle fleets under three ownership schemes, shared-cost
//! apportionment, and the resulting margin per brand and consolidated.
//!
//! # Example
//!
//! ```no_run
//! use cost_simulator::config::ConfigLoader;
//! use cost_simulator::provider::InMemoryDataProvider;
//! use cost_simulator::simulation::run_simulation;
//!
//! let scenarios = ConfigLoader::load_all("./config/scenarios")?;
//! let provider = InMemoryDataProvider::from_scenarios(scenarios)?;
//! let result = run_simulation(&provider, "base_2025", &["alpha".to_string()])?;
//! println!("{}", serde_json::to_string_pretty(&result.to_flat_json()).unwrap());
//! # Ok::<(), cost_simulator::error::EngineError>(())
//! ```

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod simulation;
