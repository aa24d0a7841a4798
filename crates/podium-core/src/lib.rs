//! Podium Core - shared infrastructure for the Olympic data pipeline
//!
//! Logging, progress reporting, and staged output sinks used by the
//! preprocessing and demo export crates.

pub mod logging;
pub mod progress;
pub mod sink;

// Re-exports for convenience
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, finish_stage, fmt_num};
pub use sink::{
    CsvSink, ParquetSink, StagedFile, cleanup_tmp_files, commit_all, write_json_atomic,
};
