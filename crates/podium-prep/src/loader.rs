//! Dataset loader: path resolution and CSV reading of the raw tables

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::config::PrepConfig;
use crate::error::PrepError;

// === Cell normalization ===

/// Empty cell → `None`. Everything else is kept verbatim.
fn null_if_empty<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<String>::deserialize(de)?;
    Ok(cell.filter(|s| !s.is_empty()))
}

/// Lenient integer: accepts `1985` and `1985.0`; anything else → `None`.
fn lenient_int<'de, D>(de: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<String>::deserialize(de)?;
    Ok(cell.as_deref().and_then(parse_int))
}

pub(crate) fn parse_int(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(v) = raw.parse::<i32>() {
        return Some(v);
    }
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i32::MIN as f64 && f <= i32::MAX as f64 {
        Some(f as i32)
    } else {
        None
    }
}

// === Raw rows ===

/// One row of the results table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawResult {
    #[serde(deserialize_with = "null_if_empty")]
    pub slug_game: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub event_title: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub discipline_title: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub participant_type: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub rank_position: Option<String>,
    /// Serialized list of `(name, profile_url)` pairs.
    #[serde(deserialize_with = "null_if_empty")]
    pub athletes: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub medal_type: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub country_name: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub country_code: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub athlete_url: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub athlete_full_name: Option<String>,
}

/// One row of the medals table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMedal {
    #[serde(deserialize_with = "null_if_empty")]
    pub athlete_url: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub slug_game: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub event_title: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub medal_type: Option<String>,
}

/// One row of the athlete bios table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawAthlete {
    #[serde(deserialize_with = "null_if_empty")]
    pub athlete_url: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub athlete_full_name: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub games_participations: Option<i32>,
    #[serde(deserialize_with = "null_if_empty")]
    pub first_game: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub athlete_year_birth: Option<i32>,
}

/// One edition of the games.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawHost {
    #[serde(deserialize_with = "null_if_empty")]
    pub game_slug: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub game_name: Option<String>,
    #[serde(deserialize_with = "lenient_int")]
    pub game_year: Option<i32>,
    #[serde(deserialize_with = "null_if_empty")]
    pub game_season: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub game_location: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub game_start_date: Option<String>,
    #[serde(deserialize_with = "null_if_empty")]
    pub game_end_date: Option<String>,
}

// === Path resolution ===

/// Resolved locations of every input of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub results: PathBuf,
    pub medals: PathBuf,
    pub athletes: PathBuf,
    pub hosts: Option<PathBuf>,
}

impl InputPaths {
    /// `(dataset, path)` pairs for the manifest.
    pub fn named(&self) -> Vec<(&'static str, &Path)> {
        let mut out = vec![
            ("results", self.results.as_path()),
            ("medals", self.medals.as_path()),
            ("athletes", self.athletes.as_path()),
        ];
        if let Some(hosts) = &self.hosts {
            out.push(("hosts", hosts.as_path()));
        }
        out
    }
}

/// `raw_dir/filename`, falling back to `data_root/filename`.
pub fn resolve_path(
    config: &PrepConfig,
    dataset: &'static str,
    filename: &str,
) -> Result<PathBuf, PrepError> {
    let primary = config.raw_dir.join(filename);
    if primary.is_file() {
        return Ok(primary);
    }
    let fallback = config.data_root.join(filename);
    if fallback.is_file() {
        log::debug!(
            "{dataset}: {} not found, using {}",
            primary.display(),
            fallback.display()
        );
        return Ok(fallback);
    }
    Err(PrepError::MissingInput {
        dataset,
        primary,
        fallback,
    })
}

/// Resolve all inputs. Required inputs fail fast; a missing hosts file is
/// only a warning.
pub fn resolve_inputs(config: &PrepConfig) -> Result<InputPaths, PrepError> {
    let results = resolve_path(config, "results", &config.files.results)?;
    let medals = resolve_path(config, "medals", &config.files.medals)?;
    let athletes = resolve_path(config, "athletes", &config.files.athletes)?;
    let hosts = resolve_hosts(config);
    Ok(InputPaths {
        results,
        medals,
        athletes,
        hosts,
    })
}

/// Optional hosts location; `None` when unconfigured or absent.
pub fn resolve_hosts(config: &PrepConfig) -> Option<PathBuf> {
    let name = config.files.hosts.as_deref()?;
    match resolve_path(config, "hosts", name) {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("{e}; editions will be dated from their slugs");
            None
        }
    }
}

// === Reading ===

fn open_source(path: &Path) -> Result<Box<dyn Read>, PrepError> {
    let file = File::open(path).map_err(|e| PrepError::Read {
        path: path.to_path_buf(),
        source: csv::Error::from(e),
    })?;
    let reader = BufReader::with_capacity(256 * 1024, file);
    let gz = path.extension().is_some_and(|ext| ext == "gz");
    Ok(if gz {
        Box::new(MultiGzDecoder::new(reader))
    } else {
        Box::new(reader)
    })
}

/// Read a whole CSV table (header row required) into typed rows.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, PrepError> {
    let source = open_source(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(source);
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row = record.map_err(|source| PrepError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        rows.push(row);
    }
    Ok(rows)
}

/// The raw tables of one run, plus where they came from.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub results: Vec<RawResult>,
    pub medals: Vec<RawMedal>,
    pub athletes: Vec<RawAthlete>,
    /// Empty when no hosts table is available.
    pub hosts: Vec<RawHost>,
    pub paths: InputPaths,
}

/// Resolve and read every input. Nothing is written.
pub fn load(config: &PrepConfig) -> Result<Datasets, PrepError> {
    let paths = resolve_inputs(config)?;
    let results = read_table(&paths.results)?;
    let medals = read_table(&paths.medals)?;
    let athletes = read_table(&paths.athletes)?;
    let hosts = match &paths.hosts {
        Some(p) => read_table(p)?,
        None => Vec::new(),
    };
    log::info!(
        "Loaded {} results, {} medals, {} athletes, {} hosts",
        results.len(),
        medals.len(),
        athletes.len(),
        hosts.len()
    );
    Ok(Datasets {
        results,
        medals,
        athletes,
        hosts,
        paths,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn setup() -> (tempfile::TempDir, PrepConfig) {
        let dir = tempfile::tempdir().unwrap();
        let config = PrepConfig::rooted_at(dir.path());
        std::fs::create_dir_all(&config.raw_dir).unwrap();
        (dir, config)
    }

    #[test]
    fn parse_int_accepts_float_renderings() {
        assert_eq!(parse_int("1985"), Some(1985));
        assert_eq!(parse_int("1985.0"), Some(1985));
        assert_eq!(parse_int(" 3 "), Some(3));
        assert_eq!(parse_int("1985.5"), None);
        assert_eq!(parse_int("nan"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("unknown"), None);
    }

    #[test]
    fn resolve_prefers_raw_dir() {
        let (_dir, config) = setup();
        std::fs::write(config.raw_dir.join("olympic_results.csv"), "a\n").unwrap();
        std::fs::write(config.data_root.join("olympic_results.csv"), "a\n").unwrap();
        let p = resolve_path(&config, "results", "olympic_results.csv").unwrap();
        assert_eq!(p, config.raw_dir.join("olympic_results.csv"));
    }

    #[test]
    fn resolve_falls_back_to_data_root() {
        let (_dir, config) = setup();
        std::fs::write(config.data_root.join("olympic_medals.csv"), "a\n").unwrap();
        let p = resolve_path(&config, "medals", "olympic_medals.csv").unwrap();
        assert_eq!(p, config.data_root.join("olympic_medals.csv"));
    }

    #[test]
    fn resolve_missing_is_missing_input() {
        let (_dir, config) = setup();
        let err = resolve_path(&config, "athletes", "olympic_athletes.csv").unwrap_err();
        match err {
            PrepError::MissingInput {
                dataset,
                primary,
                fallback,
            } => {
                assert_eq!(dataset, "athletes");
                assert_eq!(primary, config.raw_dir.join("olympic_athletes.csv"));
                assert_eq!(fallback, config.data_root.join("olympic_athletes.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_hosts_is_not_an_error() {
        let (_dir, config) = setup();
        assert!(resolve_hosts(&config).is_none());
        let unconfigured = PrepConfig {
            files: crate::config::InputFiles {
                hosts: None,
                ..Default::default()
            },
            ..config
        };
        assert!(resolve_hosts(&unconfigured).is_none());
    }

    #[test]
    fn read_results_maps_empty_cells_to_none() {
        let (_dir, config) = setup();
        let path = config.raw_dir.join("olympic_results.csv");
        std::fs::write(
            &path,
            "slug_game,event_title,rank_position,athletes,medal_type,country_name,extra\n\
             tokyo-2020,100m,3,\"[('Jane Doe', '/ath/1')]\",,Kenya,x\n",
        )
        .unwrap();
        let rows: Vec<RawResult> = read_table(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.slug_game.as_deref(), Some("tokyo-2020"));
        assert_eq!(r.rank_position.as_deref(), Some("3"));
        assert_eq!(r.athletes.as_deref(), Some("[('Jane Doe', '/ath/1')]"));
        assert_eq!(r.medal_type, None);
        // Columns absent from the file read as null
        assert_eq!(r.athlete_url, None);
        assert_eq!(r.discipline_title, None);
    }

    #[test]
    fn read_athletes_lenient_numbers() {
        let (_dir, config) = setup();
        let path = config.raw_dir.join("olympic_athletes.csv");
        std::fs::write(
            &path,
            "athlete_url,athlete_full_name,games_participations,first_game,athlete_year_birth\n\
             /ath/1,Jane Doe,2,Rio 2016,1994.0\n\
             /ath/2,John Roe,,,unknown\n",
        )
        .unwrap();
        let rows: Vec<RawAthlete> = read_table(&path).unwrap();
        assert_eq!(rows[0].athlete_year_birth, Some(1994));
        assert_eq!(rows[0].games_participations, Some(2));
        assert_eq!(rows[1].athlete_year_birth, None);
        assert_eq!(rows[1].first_game, None);
    }

    #[test]
    fn read_gzip_source() {
        let (_dir, config) = setup();
        let path = config.raw_dir.join("olympic_medals.csv.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        gz.write_all(b"athlete_url,slug_game,event_title,medal_type\n/ath/1,tokyo-2020,100m,BRONZE\n")
            .unwrap();
        gz.finish().unwrap();

        let rows: Vec<RawMedal> = read_table(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].medal_type.as_deref(), Some("BRONZE"));
    }

    #[test]
    fn ragged_csv_is_read_error() {
        let (_dir, config) = setup();
        let path = config.raw_dir.join("olympic_medals.csv");
        std::fs::write(&path, "athlete_url,slug_game\n/ath/1,tokyo-2020,extra\n").unwrap();
        let err = read_table::<RawMedal>(&path).unwrap_err();
        assert!(matches!(err, PrepError::Read { .. }));
    }

    #[test]
    fn load_reads_all_tables() {
        let (_dir, config) = setup();
        std::fs::write(
            config.raw_dir.join("olympic_results.csv"),
            "slug_game,athletes\ntokyo-2020,[]\n",
        )
        .unwrap();
        std::fs::write(
            config.raw_dir.join("olympic_medals.csv"),
            "athlete_url,slug_game,event_title,medal_type\n",
        )
        .unwrap();
        std::fs::write(
            config.data_root.join("olympic_athletes.csv"),
            "athlete_url,athlete_full_name\n/ath/1,Jane Doe\n",
        )
        .unwrap();
        std::fs::write(
            config.raw_dir.join("olympic_hosts.csv"),
            "game_slug,game_name,game_year\ntokyo-2020,Tokyo 2020,2020\n",
        )
        .unwrap();

        let data = load(&config).unwrap();
        assert_eq!(data.results.len(), 1);
        assert!(data.medals.is_empty());
        assert_eq!(data.athletes.len(), 1);
        assert_eq!(data.hosts[0].game_year, Some(2020));
        assert_eq!(data.paths.named().len(), 4);
    }
}
