//! Preprocessing configuration: input locations and output formats

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Serialized form of a processed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Csv,
    Parquet,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Parquet => "parquet",
        }
    }
}

/// File names of the raw inputs, resolved against `raw_dir` then `data_root`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFiles {
    pub results: String,
    pub medals: String,
    pub athletes: String,
    /// Optional edition calendar; a missing file is not an error.
    pub hosts: Option<String>,
}

impl Default for InputFiles {
    fn default() -> Self {
        Self {
            results: "olympic_results.csv".to_string(),
            medals: "olympic_medals.csv".to_string(),
            athletes: "olympic_athletes.csv".to_string(),
            hosts: Some("olympic_hosts.csv".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepConfig {
    pub data_root: PathBuf,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub files: InputFiles,
    pub formats: Vec<OutputFormat>,
    pub zstd_level: i32,
}

impl Default for PrepConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("data"),
            raw_dir: PathBuf::from("data/raw"),
            processed_dir: PathBuf::from("data/processed"),
            files: InputFiles::default(),
            formats: vec![OutputFormat::Csv, OutputFormat::Parquet],
            zstd_level: 3,
        }
    }
}

impl PrepConfig {
    /// Config rooted at `root`, with `raw/` and `processed/` beneath it.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            raw_dir: root.join("raw"),
            processed_dir: root.join("processed"),
            data_root: root,
            ..Self::default()
        }
    }

    /// Configured formats without duplicates, in first-seen order.
    pub fn output_formats(&self) -> Vec<OutputFormat> {
        let mut seen = Vec::with_capacity(self.formats.len());
        for f in &self.formats {
            if !seen.contains(f) {
                seen.push(*f);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_data_layout() {
        let c = PrepConfig::default();
        assert_eq!(c.raw_dir, PathBuf::from("data/raw"));
        assert_eq!(c.processed_dir, PathBuf::from("data/processed"));
        assert_eq!(c.files.results, "olympic_results.csv");
        assert_eq!(c.files.hosts.as_deref(), Some("olympic_hosts.csv"));
        assert_eq!(
            c.output_formats(),
            vec![OutputFormat::Csv, OutputFormat::Parquet]
        );
    }

    #[test]
    fn rooted_at_places_subdirs() {
        let c = PrepConfig::rooted_at("/tmp/olympics");
        assert_eq!(c.data_root, PathBuf::from("/tmp/olympics"));
        assert_eq!(c.raw_dir, PathBuf::from("/tmp/olympics/raw"));
        assert_eq!(c.processed_dir, PathBuf::from("/tmp/olympics/processed"));
    }

    #[test]
    fn output_formats_dedup() {
        let c = PrepConfig {
            formats: vec![
                OutputFormat::Parquet,
                OutputFormat::Csv,
                OutputFormat::Parquet,
            ],
            ..PrepConfig::default()
        };
        assert_eq!(
            c.output_formats(),
            vec![OutputFormat::Parquet, OutputFormat::Csv]
        );
    }

    #[test]
    fn extension() {
        assert_eq!(OutputFormat::Csv.extension(), "csv");
        assert_eq!(OutputFormat::Parquet.extension(), "parquet");
    }
}
