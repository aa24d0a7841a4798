//! Pipeline runner: load → explode → join → unify → aggregate → features →
//! commit

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use podium_core::{ProgressContext, StagedFile, cleanup_tmp_files, finish_stage, fmt_num};
use podium_store::RunManifest;

use crate::aggregate::{CountryEditionSummary, summarize};
use crate::athletes::{ExplodeStats, explode};
use crate::config::PrepConfig;
use crate::features::{EditionCalendar, FeatureRow, derive_features};
use crate::loader::{self, Datasets, RawHost};
use crate::output::{self, FEATURES_STEM, FULL_STEM, SUMMARY_STEM};
use crate::reconcile::{ReconcileStats, reconcile};
use crate::transform::{FeatureAccumulator, FullAccumulator, SummaryAccumulator};
use crate::unify::{UnifiedResult, unify};

/// The three processed tables of one run.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    pub full: Vec<UnifiedResult>,
    pub summary: Vec<CountryEditionSummary>,
    pub features: Vec<FeatureRow>,
    pub explode: ExplodeStats,
    pub reconcile: ReconcileStats,
}

/// Pipeline execution summary
#[derive(Debug)]
pub struct Summary {
    pub results: usize,
    pub exploded_rows: usize,
    pub malformed_lists: usize,
    pub medal_matches: usize,
    pub fanout_rows: usize,
    pub full_rows: usize,
    pub summary_rows: usize,
    pub feature_rows: usize,
    /// Committed outputs with their row counts.
    pub outputs: Vec<(PathBuf, usize)>,
    pub content_hash: String,
    pub elapsed: Duration,
}

/// Every transformation stage, in memory.
pub fn build_tables(data: &Datasets, progress: &ProgressContext) -> Tables {
    let pb = progress.stage_line("explode");
    let (exploded, explode_stats) = explode(&data.results);
    finish_stage(
        &pb,
        format!(
            "{} results → {} rows ({} malformed lists)",
            fmt_num(explode_stats.results),
            fmt_num(explode_stats.rows),
            fmt_num(explode_stats.malformed)
        ),
    );

    let pb = progress.stage_line("join");
    let (joined, reconcile_stats) = reconcile(&exploded, &data.medals, &data.athletes);
    let full = unify(&joined);
    finish_stage(
        &pb,
        format!(
            "{} unified rows, {} medal matches",
            fmt_num(full.len()),
            fmt_num(reconcile_stats.medal_matches)
        ),
    );

    let pb = progress.stage_line("aggregate");
    let summary = summarize(&full);
    finish_stage(&pb, format!("{} country-editions", fmt_num(summary.len())));

    let pb = progress.stage_line("features");
    let calendar = EditionCalendar::from_hosts(&data.hosts);
    let features = derive_features(&summary, &calendar);
    finish_stage(&pb, format!("{} feature rows", fmt_num(features.len())));

    Tables {
        full,
        summary,
        features,
        explode: explode_stats,
        reconcile: reconcile_stats,
    }
}

/// Stage all three tables, then commit them together.
fn write_tables(config: &PrepConfig, tables: &Tables) -> Result<Vec<(PathBuf, usize)>> {
    let dir = &config.processed_dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    cleanup_tmp_files(dir).context("Failed to remove stale tmp files")?;

    let formats = config.output_formats();
    let level = config.zstd_level;
    let mut staged: Vec<StagedFile> = Vec::new();
    staged.extend(
        output::stage_table::<FullAccumulator>(dir, FULL_STEM, &tables.full, &formats, level)
            .context("Failed to write full table")?,
    );
    staged.extend(
        output::stage_table::<SummaryAccumulator>(dir, SUMMARY_STEM, &tables.summary, &formats, level)
            .context("Failed to write summary table")?,
    );
    staged.extend(
        output::stage_table::<FeatureAccumulator>(dir, FEATURES_STEM, &tables.features, &formats, level)
            .context("Failed to write feature table")?,
    );
    output::commit(staged).context("Failed to commit outputs")
}

/// Run the preprocessing pipeline.
///
/// Inputs are resolved and read before anything is written, so a missing
/// input leaves previous outputs untouched.
pub fn run(config: &PrepConfig, progress: &ProgressContext) -> Result<Summary> {
    let start = Instant::now();

    let pb = progress.stage_line("load");
    let data = loader::load(config)?;
    finish_stage(
        &pb,
        format!(
            "{} results, {} medals, {} athletes",
            fmt_num(data.results.len()),
            fmt_num(data.medals.len()),
            fmt_num(data.athletes.len())
        ),
    );

    let tables = build_tables(&data, progress);

    let pb = progress.stage_line("write");
    let outputs = write_tables(config, &tables)?;
    let manifest = RunManifest::build(&data.paths.named(), &outputs)?;
    manifest.write_to(&config.processed_dir)?;
    finish_stage(
        &pb,
        format!(
            "{} files → {} ({})",
            outputs.len(),
            config.processed_dir.display(),
            manifest.short_content_hash()
        ),
    );

    let summary = Summary {
        results: tables.explode.results,
        exploded_rows: tables.explode.rows,
        malformed_lists: tables.explode.malformed,
        medal_matches: tables.reconcile.medal_matches,
        fanout_rows: tables.reconcile.medal_fanout + tables.reconcile.profile_fanout,
        full_rows: tables.full.len(),
        summary_rows: tables.summary.len(),
        feature_rows: tables.features.len(),
        outputs,
        content_hash: manifest.content_hash.clone(),
        elapsed: start.elapsed(),
    };

    log::info!("=== Preprocessing Summary ===");
    log::info!(
        "Rows: {} results → {} unified → {} country-editions",
        summary.results,
        summary.full_rows,
        summary.summary_rows
    );
    log::info!("Content hash: {}", manifest.short_content_hash());
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}

/// Outcome of deriving features from an existing summary file.
#[derive(Debug)]
pub struct FeaturesSummary {
    pub summary_rows: usize,
    pub feature_rows: usize,
    pub outputs: Vec<(PathBuf, usize)>,
    pub elapsed: Duration,
}

fn load_calendar(config: &PrepConfig) -> Result<EditionCalendar> {
    let hosts: Vec<RawHost> = match loader::resolve_hosts(config) {
        Some(path) => loader::read_table(&path)?,
        None => Vec::new(),
    };
    Ok(EditionCalendar::from_hosts(&hosts))
}

/// Derive the feature table from a summary CSV and write it to
/// `processed_dir`, refreshing the manifest when one exists.
pub fn run_features(config: &PrepConfig, summary_path: &Path) -> Result<FeaturesSummary> {
    let start = Instant::now();
    if !summary_path.is_file() {
        bail!(
            "Missing summary file at {}. Run preprocessing first.",
            summary_path.display()
        );
    }
    let summary: Vec<CountryEditionSummary> = loader::read_table(summary_path)?;
    let calendar = load_calendar(config)?;
    let features = derive_features(&summary, &calendar);

    let dir = &config.processed_dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let staged = output::stage_table::<FeatureAccumulator>(
        dir,
        FEATURES_STEM,
        &features,
        &config.output_formats(),
        config.zstd_level,
    )
    .context("Failed to write feature table")?;
    let outputs = output::commit(staged).context("Failed to commit outputs")?;

    let mut manifest = match RunManifest::read_from(dir) {
        Ok(m) => m,
        Err(e) => {
            log::debug!("No usable manifest ({e:#}); starting a new one");
            RunManifest::build(&[("summary", summary_path)], &[])?
        }
    };
    manifest.record_outputs(&outputs)?;
    manifest.write_to(dir)?;

    Ok(FeaturesSummary {
        summary_rows: summary.len(),
        feature_rows: features.len(),
        outputs,
        elapsed: start.elapsed(),
    })
}
