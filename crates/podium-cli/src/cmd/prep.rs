//! `podium prep` - preprocess raw tables into the processed outputs

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use podium_core::{SharedProgress, fmt_num};
use podium_prep::{OutputFormat, PrepConfig};

use super::{print_summary, secs};
use crate::config::Config;

#[derive(Clone, Copy, ValueEnum, Debug)]
pub enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => Self::Csv,
            FormatArg::Parquet => Self::Parquet,
        }
    }
}

/// Overrides for the `[prep]` config section
#[derive(Args, Debug, Default)]
pub struct PrepOverrides {
    /// Data root; raw/ and processed/ are placed under it
    #[arg(long)]
    pub data_root: Option<PathBuf>,

    /// Directory holding the raw CSVs
    #[arg(long)]
    pub raw_dir: Option<PathBuf>,

    /// Output directory for processed tables
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output formats (repeatable)
    #[arg(short, long, value_enum)]
    pub format: Vec<FormatArg>,

    /// Zstd compression level for Parquet (1-22)
    #[arg(short, long)]
    pub zstd_level: Option<i32>,
}

impl PrepOverrides {
    /// Config values, with flags taking precedence.
    pub fn apply(&self, config: &PrepConfig) -> PrepConfig {
        let mut out = match &self.data_root {
            Some(root) => PrepConfig {
                files: config.files.clone(),
                formats: config.formats.clone(),
                zstd_level: config.zstd_level,
                ..PrepConfig::rooted_at(root)
            },
            None => config.clone(),
        };
        if let Some(dir) = &self.raw_dir {
            out.raw_dir = dir.clone();
        }
        if let Some(dir) = &self.output {
            out.processed_dir = dir.clone();
        }
        if !self.format.is_empty() {
            out.formats = self.format.iter().copied().map(OutputFormat::from).collect();
        }
        if let Some(level) = self.zstd_level {
            out.zstd_level = level;
        }
        out
    }
}

#[derive(Args, Debug)]
pub struct PrepArgs {
    #[command(flatten)]
    pub overrides: PrepOverrides,
}

pub fn run(args: PrepArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let prep = args.overrides.apply(&config.prep);
    let summary = podium_prep::run(&prep, progress)?;
    print_prep_summary(&summary);
    Ok(())
}

pub fn print_prep_summary(summary: &podium_prep::Summary) {
    let mut rows = vec![
        ("Results", fmt_num(summary.results)),
        ("Exploded rows", fmt_num(summary.exploded_rows)),
        ("Malformed lists", fmt_num(summary.malformed_lists)),
        ("Medal matches", fmt_num(summary.medal_matches)),
        ("Fan-out rows", fmt_num(summary.fanout_rows)),
        ("Full rows", fmt_num(summary.full_rows)),
        ("Summary rows", fmt_num(summary.summary_rows)),
        ("Feature rows", fmt_num(summary.feature_rows)),
        ("Content hash", summary.content_hash.chars().take(16).collect()),
    ];
    for (path, _) in &summary.outputs {
        rows.push(("Output", path.display().to_string()));
    }
    rows.push(("Time", secs(summary.elapsed)));
    print_summary("Preprocessing", &rows);
}
