//! `podium verify` - check processed outputs against the run manifest

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use podium_store::RunManifest;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Processed directory (containing manifest.json)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

pub fn run(args: VerifyArgs, config: &Config) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| config.prep.processed_dir.clone());
    let manifest = RunManifest::read_from(&dir)?;
    let results = manifest.verify(&dir);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("File").fg(Color::Cyan),
            Cell::new("Rows").fg(Color::Cyan),
            Cell::new("Status").fg(Color::Cyan),
        ]);

    for r in &results {
        let status = match &r.actual {
            _ if r.ok() => Cell::new("OK").fg(Color::Green),
            Some(_) => Cell::new("MISMATCH").fg(Color::Red),
            None => Cell::new("MISSING").fg(Color::Red),
        };
        let rows = manifest.rows.get(&r.file).copied().unwrap_or_default();
        table.add_row(vec![Cell::new(&r.file), Cell::new(rows), status]);
    }

    eprintln!("\n{table}");
    eprintln!("Content hash: {}", manifest.short_content_hash());

    let failed = results.iter().filter(|r| !r.ok()).count();
    if failed > 0 {
        for r in results.iter().filter(|r| !r.ok()) {
            eprintln!(
                "  {}: expected {}, got {}",
                r.file,
                r.expected,
                r.actual.as_deref().unwrap_or("<missing>")
            );
        }
        bail!("{failed} of {} outputs failed verification", results.len());
    }
    eprintln!("All outputs verified OK.");
    Ok(())
}
