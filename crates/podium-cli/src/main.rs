//! podium - Olympic results preprocessing CLI
//!
//! Turns raw Olympic results, medals and athlete tables into unified,
//! aggregated and feature tables, and exports demo JSON payloads.

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "podium")]
#[command(about = "Olympic results preprocessing pipeline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Config file path (default: ./podium.toml or ~/.config/podium/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Unify, aggregate and derive features from the raw tables
    Prep(cmd::prep::PrepArgs),
    /// Derive the feature table from an existing summary CSV
    Features(cmd::features::FeaturesArgs),
    /// Build demo JSON payloads from processed outputs
    Demo(cmd::demo::DemoArgs),
    /// Run prep followed by demo
    Run(cmd::run::RunArgs),
    /// Verify processed outputs against the run manifest
    Verify(cmd::verify::VerifyArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let progress = Arc::new(podium_core::ProgressContext::new());

    // Logging:
    //   TTY:     warn unless --debug (spinners show activity)
    //   non-TTY: info unless --debug or -q
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = cli.quiet || (is_tty && !cli.debug);
    podium_core::init_logging(quiet, cli.debug, multi);

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Prep(args) => cmd::prep::run(args, &config, &progress),
        Command::Features(args) => cmd::features::run(args, &config),
        Command::Demo(args) => cmd::demo::run(args, &config, &progress),
        Command::Run(args) => cmd::run::run(args, &config, &progress),
        Command::Verify(args) => cmd::verify::run(args, &config),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let prep = &config.prep;
            let demo = &config.demo;
            let formats: Vec<&str> = prep.output_formats().iter().map(|f| f.extension()).collect();

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["Data root", &prep.data_root.display().to_string()]);
            table.add_row(vec!["Raw directory", &prep.raw_dir.display().to_string()]);
            table.add_row(vec![
                "Processed directory",
                &prep.processed_dir.display().to_string(),
            ]);
            table.add_row(vec!["Results file", &prep.files.results]);
            table.add_row(vec!["Medals file", &prep.files.medals]);
            table.add_row(vec!["Athletes file", &prep.files.athletes]);
            table.add_row(vec![
                "Hosts file",
                prep.files.hosts.as_deref().unwrap_or("not set"),
            ]);
            table.add_row(vec!["Formats", &formats.join(", ")]);
            table.add_row(vec!["Compression level", &prep.zstd_level.to_string()]);
            table.add_row(vec!["Demo directory", &demo.demo_dir.display().to_string()]);
            table.add_row(vec![
                "Predictions",
                &demo
                    .predictions
                    .as_ref()
                    .map_or_else(|| "not set".to_string(), |p| p.display().to_string()),
            ]);
            table.add_row(vec!["Reference year", &demo.reference_year.to_string()]);
            table.add_row(vec!["Model", &format!("{} ({})", demo.model_name, demo.target)]);

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
