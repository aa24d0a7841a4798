//! `podium features` - derive the feature table from an existing summary

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use podium_core::fmt_num;
use podium_prep::output::SUMMARY_STEM;

use super::prep::PrepOverrides;
use super::{print_summary, secs};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct FeaturesArgs {
    /// Summary CSV (default: <processed>/country_year_summary.csv)
    #[arg(short, long)]
    pub summary: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: PrepOverrides,
}

pub fn run(args: FeaturesArgs, config: &Config) -> Result<()> {
    let prep = args.overrides.apply(&config.prep);
    let summary_path = args
        .summary
        .unwrap_or_else(|| prep.processed_dir.join(format!("{SUMMARY_STEM}.csv")));

    let out = podium_prep::run_features(&prep, &summary_path)?;

    let mut rows = vec![
        ("Summary rows", fmt_num(out.summary_rows)),
        ("Feature rows", fmt_num(out.feature_rows)),
    ];
    for (path, _) in &out.outputs {
        rows.push(("Output", path.display().to_string()));
    }
    rows.push(("Time", secs(out.elapsed)));
    print_summary("Features", &rows);
    Ok(())
}
