//! Olympic results preprocessing
//!
//! Turns the raw results, medals and athlete tables into the unified
//! per-athlete result table, the per country/edition summary, and the
//! model feature table.
//!
//! ```text
//! loader ─► athletes (explode) ─► reconcile ─► unify ─► aggregate ─► features
//! ```

pub mod aggregate;
pub mod athletes;
pub mod config;
pub mod error;
pub mod features;
pub mod literal;
pub mod loader;
pub mod order;
pub mod output;
pub mod reconcile;
pub mod runner;
pub mod schema;
pub mod transform;
pub mod unify;

pub use aggregate::{CountryEditionSummary, summarize};
pub use athletes::{AthleteEntry, ExplodedResult, explode, parse_athlete_list};
pub use config::{InputFiles, OutputFormat, PrepConfig};
pub use error::PrepError;
pub use features::{EditionCalendar, FeatureRow, derive_features, slug_year};
pub use loader::{Datasets, RawAthlete, RawHost, RawMedal, RawResult, load, read_table};
pub use reconcile::reconcile;
pub use runner::{FeaturesSummary, Summary, Tables, build_tables, run, run_features};
pub use unify::{UnifiedResult, unify};
