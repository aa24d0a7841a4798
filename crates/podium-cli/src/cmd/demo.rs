//! `podium demo` - write demo JSON payloads from processed outputs

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use podium_core::{SharedProgress, fmt_num};
use podium_demo::DemoConfig;

use super::prep::PrepOverrides;
use super::{print_summary, secs};
use crate::config::Config;

/// Overrides for the `[demo]` config section
#[derive(Args, Debug, Default)]
pub struct DemoOverrides {
    /// Output directory for JSON payloads
    #[arg(long)]
    pub demo_dir: Option<PathBuf>,

    /// Model predictions CSV
    #[arg(long)]
    pub predictions: Option<PathBuf>,

    /// Year ages are computed against
    #[arg(long)]
    pub reference_year: Option<i32>,
}

impl DemoOverrides {
    pub fn apply(&self, config: &DemoConfig) -> DemoConfig {
        let mut out = config.clone();
        if let Some(dir) = &self.demo_dir {
            out.demo_dir = dir.clone();
        }
        if let Some(p) = &self.predictions {
            out.predictions = Some(p.clone());
        }
        if let Some(y) = self.reference_year {
            out.reference_year = y;
        }
        out
    }
}

#[derive(Args, Debug)]
pub struct DemoArgs {
    #[command(flatten)]
    pub prep: PrepOverrides,

    #[command(flatten)]
    pub demo: DemoOverrides,
}

pub fn run(args: DemoArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let prep = args.prep.apply(&config.prep);
    let demo = args.demo.apply(&config.demo);
    let summary = podium_demo::run(&prep, &demo, progress)?;
    print_demo_summary(&summary);
    Ok(())
}

pub fn print_demo_summary(summary: &podium_demo::DemoSummary) {
    let mut rows = vec![
        ("Athletes", fmt_num(summary.athletes)),
        ("Results", fmt_num(summary.results)),
        ("Skipped rows", fmt_num(summary.skipped_rows)),
        ("Hosts", fmt_num(summary.hosts)),
        ("Summary rows", fmt_num(summary.summary_rows)),
        (
            "Predictions",
            summary
                .predictions
                .map_or_else(|| "skipped".to_string(), fmt_num),
        ),
    ];
    for path in &summary.files {
        rows.push(("Output", path.display().to_string()));
    }
    rows.push(("Time", secs(summary.elapsed)));
    print_summary("Demo export", &rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_demo_config() {
        let overrides = DemoOverrides {
            predictions: Some(PathBuf::from("p.csv")),
            reference_year: Some(2030),
            ..Default::default()
        };
        let out = overrides.apply(&DemoConfig::default());
        assert_eq!(out.predictions, Some(PathBuf::from("p.csv")));
        assert_eq!(out.reference_year, 2030);
        assert_eq!(out.demo_dir, PathBuf::from("data/demo"));
    }
}
