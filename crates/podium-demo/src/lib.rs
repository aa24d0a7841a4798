//! Demo JSON payloads built from the processed Olympic tables
//!
//! Reads `olympic_full.csv` and `country_year_summary.csv`, plus the hosts
//! table and optional model predictions, and writes the flat JSON files the
//! API serves in demo mode.

pub mod config;
pub mod export;
pub mod hosts;
pub mod registry;

pub use config::DemoConfig;
pub use export::{DemoPayloads, DemoSummary, build, run};
pub use hosts::{HostCatalog, HostInfo};
pub use registry::{AthleteRecord, AthleteRegistry};
