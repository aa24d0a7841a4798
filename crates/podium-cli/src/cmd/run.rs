//! `podium run` - prep followed by the demo export

use anyhow::Result;
use clap::Args;
use podium_core::SharedProgress;

use super::demo::{DemoOverrides, print_demo_summary};
use super::prep::{PrepOverrides, print_prep_summary};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub prep: PrepOverrides,

    #[command(flatten)]
    pub demo: DemoOverrides,

    /// Stop after preprocessing
    #[arg(long)]
    pub skip_demo: bool,
}

pub fn run(args: RunArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let prep = args.prep.apply(&config.prep);
    let summary = podium_prep::run(&prep, progress)?;
    print_prep_summary(&summary);

    if args.skip_demo {
        return Ok(());
    }
    let demo = args.demo.apply(&config.demo);
    let demo_summary = podium_demo::run(&prep, &demo, progress)?;
    print_demo_summary(&demo_summary);

    eprintln!("\nPipeline completed.");
    Ok(())
}
