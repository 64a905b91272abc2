//! Configuration loading for the cost simulator.
//!
//! This module loads scenario configurations from YAML files: scenario
//! metadata, the statutory benefit factor table, brands, and resource lines.
//!
//! # Example
//!
//! ```no_run
//! use cost_simulator::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/scenarios/base_2025").unwrap();
//! println!("Loaded scenario: {}", config.metadata().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{BrandsConfig, ResourcesConfig, ScenarioMetadata};
