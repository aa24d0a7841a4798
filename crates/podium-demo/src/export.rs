//! Demo JSON export from the processed tables

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use podium_core::{ProgressContext, finish_stage, fmt_num, write_json_atomic};
use podium_prep::loader::{read_table, resolve_hosts};
use podium_prep::output::{FULL_STEM, SUMMARY_STEM};
use podium_prep::{CountryEditionSummary, PrepConfig, RawHost, UnifiedResult, slug_year};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::DemoConfig;
use crate::hosts::{HostCatalog, HostInfo};
use crate::registry::{AthleteRecord, AthleteRegistry, compute_age};

/// One `results.json` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultEntry {
    pub id: u32,
    pub athlete_id: u32,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub nationality: Option<String>,
    pub country: Option<String>,
    pub year: Option<i32>,
    pub season: Option<String>,
    pub city: Option<String>,
    pub sport: Option<String>,
    pub event: Option<String>,
    pub medal: Option<String>,
    pub slug_game: Option<String>,
    pub country_code: Option<String>,
}

/// A row of the model predictions CSV.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PredictionRow {
    pub country_name: Option<String>,
    pub slug_game: Option<String>,
    pub predicted_medals_total: Option<f64>,
}

/// One `medal_predictions_demo.json` entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionEntry {
    pub country: Option<String>,
    pub slug_game: Option<String>,
    pub year: Option<i32>,
    pub model_name: String,
    pub target: String,
    pub predicted_value: f64,
    pub created_at: String,
    pub actual_medals: Option<i64>,
}

/// Everything written to the demo directory.
#[derive(Debug, Default)]
pub struct DemoPayloads {
    pub athletes: Vec<AthleteRecord>,
    pub results: Vec<ResultEntry>,
    pub hosts: Vec<HostInfo>,
    pub summary: Vec<CountryEditionSummary>,
    pub predictions: Option<Vec<PredictionEntry>>,
    /// Full-table rows with neither profile URL nor name.
    pub skipped_rows: usize,
}

/// Registry and result entries from the full table, in one scan.
pub fn build_results(
    full: &[UnifiedResult],
    hosts: &HostCatalog,
    reference_year: i32,
) -> (Vec<AthleteRecord>, Vec<ResultEntry>, usize) {
    let mut registry = AthleteRegistry::new(reference_year);
    let mut results = Vec::with_capacity(full.len());
    let mut skipped = 0;

    for row in full {
        let Some(athlete_id) = registry.observe(row) else {
            skipped += 1;
            continue;
        };
        let host = row.slug_game.as_deref().and_then(|s| hosts.get(s));
        let year = host
            .and_then(|h| h.year)
            .or_else(|| row.slug_game.as_deref().and_then(slug_year));

        results.push(ResultEntry {
            id: results.len() as u32 + 1,
            athlete_id,
            name: row.athlete_full_name.clone(),
            gender: None,
            age: compute_age(row.athlete_year_birth, reference_year),
            nationality: row.country_name.clone(),
            country: row.country_name.clone(),
            year,
            season: host.and_then(|h| h.season.clone()),
            city: host.and_then(|h| h.city.clone()),
            sport: row.discipline_title.clone(),
            event: row.event_title.clone(),
            medal: row.medal_type_final.clone().or_else(|| row.medal_type.clone()),
            slug_game: row.slug_game.clone(),
            country_code: row.country_code.clone(),
        });
    }
    if skipped > 0 {
        log::debug!("Skipped {skipped} rows without athlete identity");
    }
    (registry.into_records(), results, skipped)
}

/// Predictions joined to actual medal totals.
pub fn build_predictions(
    rows: &[PredictionRow],
    summary: &[CountryEditionSummary],
    config: &DemoConfig,
    created_at: &str,
) -> Vec<PredictionEntry> {
    let actual: FxHashMap<(Option<&str>, Option<&str>), i64> = summary
        .iter()
        .map(|s| ((s.country_name.as_deref(), s.slug_game.as_deref()), s.medals_total))
        .collect();

    rows.iter()
        .map(|p| {
            let key = (p.country_name.as_deref(), p.slug_game.as_deref());
            PredictionEntry {
                country: p.country_name.clone(),
                slug_game: p.slug_game.clone(),
                year: p.slug_game.as_deref().and_then(slug_year),
                model_name: config.model_name.clone(),
                target: config.target.clone(),
                predicted_value: p.predicted_medals_total.unwrap_or(0.0),
                created_at: created_at.to_string(),
                actual_medals: actual.get(&key).copied(),
            }
        })
        .collect()
}

fn require(path: PathBuf) -> Result<PathBuf> {
    if !path.is_file() {
        bail!(
            "Missing processed file {}. Run `podium prep` first.",
            path.display()
        );
    }
    Ok(path)
}

/// Read processed outputs and assemble every payload. Nothing is written.
pub fn build(prep: &PrepConfig, config: &DemoConfig) -> Result<DemoPayloads> {
    let full_path = require(prep.processed_dir.join(format!("{FULL_STEM}.csv")))?;
    let summary_path = require(prep.processed_dir.join(format!("{SUMMARY_STEM}.csv")))?;

    let host_rows: Vec<RawHost> = match resolve_hosts(prep) {
        Some(p) => read_table(&p)?,
        None => Vec::new(),
    };
    let hosts = HostCatalog::from_rows(&host_rows);

    let full: Vec<UnifiedResult> = read_table(&full_path)?;
    let summary: Vec<CountryEditionSummary> = read_table(&summary_path)?;
    let (athletes, results, skipped_rows) = build_results(&full, &hosts, config.reference_year);

    let predictions = match config.predictions.as_deref() {
        Some(p) if p.is_file() => {
            let rows: Vec<PredictionRow> = read_table(p)?;
            let created_at = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
            Some(build_predictions(&rows, &summary, config, &created_at))
        }
        Some(p) => {
            log::warn!("No predictions at {}; skipping", p.display());
            None
        }
        None => None,
    };

    Ok(DemoPayloads {
        athletes,
        results,
        hosts: hosts.hosts().to_vec(),
        summary,
        predictions,
        skipped_rows,
    })
}

fn write_payload<T: Serialize>(dir: &Path, name: &str, items: &[T]) -> Result<PathBuf> {
    let path = dir.join(name);
    write_json_atomic(&path, items).with_context(|| format!("Failed to write {}", path.display()))?;
    log::info!("Wrote {} ({} objects)", path.display(), items.len());
    Ok(path)
}

/// Demo export summary
#[derive(Debug)]
pub struct DemoSummary {
    pub athletes: usize,
    pub results: usize,
    pub hosts: usize,
    pub summary_rows: usize,
    pub predictions: Option<usize>,
    pub skipped_rows: usize,
    pub files: Vec<PathBuf>,
    pub elapsed: Duration,
}

/// Build and write all demo payloads.
pub fn run(prep: &PrepConfig, config: &DemoConfig, progress: &ProgressContext) -> Result<DemoSummary> {
    let start = Instant::now();

    let pb = progress.stage_line("demo");
    let payloads = build(prep, config)?;

    let dir = &config.demo_dir;
    std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let mut files = vec![
        write_payload(dir, "athletes.json", &payloads.athletes)?,
        write_payload(dir, "results.json", &payloads.results)?,
        write_payload(dir, "hosts.json", &payloads.hosts)?,
        write_payload(dir, "country_year_summary_demo.json", &payloads.summary)?,
    ];
    if let Some(predictions) = &payloads.predictions {
        files.push(write_payload(dir, "medal_predictions_demo.json", predictions)?);
    }
    finish_stage(
        &pb,
        format!(
            "{} athletes, {} results → {}",
            fmt_num(payloads.athletes.len()),
            fmt_num(payloads.results.len()),
            dir.display()
        ),
    );

    Ok(DemoSummary {
        athletes: payloads.athletes.len(),
        results: payloads.results.len(),
        hosts: payloads.hosts.len(),
        summary_rows: payloads.summary.len(),
        predictions: payloads.predictions.as_ref().map(Vec::len),
        skipped_rows: payloads.skipped_rows,
        files,
        elapsed: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_row(url: Option<&str>, name: Option<&str>, slug: &str) -> UnifiedResult {
        UnifiedResult {
            athlete_url: url.map(str::to_string),
            athlete_full_name: name.map(str::to_string),
            slug_game: Some(slug.to_string()),
            country_name: Some("Kenya".into()),
            discipline_title: Some("Athletics".into()),
            event_title: Some("100m".into()),
            athlete_year_birth: Some(1994),
            ..Default::default()
        }
    }

    fn tokyo_hosts() -> HostCatalog {
        HostCatalog::from_rows(&[RawHost {
            game_slug: Some("tokyo-2020".into()),
            game_name: Some("Tokyo 2020".into()),
            game_year: Some(2021),
            game_season: Some("Summer".into()),
            ..Default::default()
        }])
    }

    #[test]
    fn results_use_host_metadata_then_slug_year() {
        let full = vec![
            full_row(Some("/ath/1"), Some("Jane"), "tokyo-2020"),
            full_row(Some("/ath/1"), Some("Jane"), "rio-2016"),
        ];
        let (athletes, results, skipped) = build_results(&full, &tokyo_hosts(), 2024);
        assert_eq!(athletes.len(), 1);
        assert_eq!(skipped, 0);
        assert_eq!(results[0].year, Some(2021));
        assert_eq!(results[0].city.as_deref(), Some("Tokyo"));
        assert_eq!(results[0].season.as_deref(), Some("Summer"));
        assert_eq!(results[1].year, Some(2016));
        assert_eq!(results[1].city, None);
        assert_eq!(results[1].athlete_id, 1);
        assert_eq!(results[1].id, 2);
        assert_eq!(results[0].age, Some(30));
        assert_eq!(results[0].sport.as_deref(), Some("Athletics"));
    }

    #[test]
    fn anonymous_rows_skipped_and_ids_contiguous() {
        let full = vec![
            full_row(None, None, "tokyo-2020"),
            full_row(None, Some("Bob"), "tokyo-2020"),
        ];
        let (_, results, skipped) = build_results(&full, &HostCatalog::default(), 2024);
        assert_eq!(skipped, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, 1);
    }

    #[test]
    fn medal_falls_back_to_result_medal() {
        let mut row = full_row(Some("/a"), None, "tokyo-2020");
        row.medal_type = Some("SILVER".into());
        let (_, results, _) = build_results(&[row.clone()], &HostCatalog::default(), 2024);
        assert_eq!(results[0].medal.as_deref(), Some("SILVER"));

        row.medal_type_final = Some("GOLD".into());
        let (_, results, _) = build_results(&[row], &HostCatalog::default(), 2024);
        assert_eq!(results[0].medal.as_deref(), Some("GOLD"));
    }

    #[test]
    fn predictions_join_actuals() {
        let summary = vec![CountryEditionSummary {
            country_name: Some("Kenya".into()),
            slug_game: Some("paris-2024".into()),
            medals_total: 11,
            ..Default::default()
        }];
        let rows = vec![
            PredictionRow {
                country_name: Some("Kenya".into()),
                slug_game: Some("paris-2024".into()),
                predicted_medals_total: Some(9.5),
            },
            PredictionRow {
                country_name: Some("Peru".into()),
                slug_game: Some("paris-2024".into()),
                predicted_medals_total: None,
            },
        ];
        let out = build_predictions(&rows, &summary, &DemoConfig::default(), "2024-08-12T00:00:00Z");
        assert_eq!(out[0].actual_medals, Some(11));
        assert_eq!(out[0].predicted_value, 9.5);
        assert_eq!(out[0].year, Some(2024));
        assert_eq!(out[0].model_name, "regression_baseline_v1");
        assert_eq!(out[1].actual_medals, None);
        assert_eq!(out[1].predicted_value, 0.0);
    }

    #[test]
    fn build_requires_processed_files() {
        let dir = tempfile::tempdir().unwrap();
        let prep = PrepConfig::rooted_at(dir.path());
        let err = build(&prep, &DemoConfig::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("olympic_full.csv"));
        assert!(msg.contains("podium prep"));
    }
}
