//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use podium_demo::DemoConfig;
use podium_prep::PrepConfig;
use serde::Deserialize;

/// Global configuration for podium
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub prep: PrepConfig,
    pub demo: DemoConfig,
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./podium.toml (current directory)
    /// 2. ~/.config/podium/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("podium.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "podium") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podium_prep::OutputFormat;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.prep.processed_dir, PathBuf::from("data/processed"));
        assert_eq!(config.prep.zstd_level, 3);
        assert_eq!(config.demo.demo_dir, PathBuf::from("data/demo"));
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[prep]
raw_dir = "/srv/olympics/raw"
formats = ["parquet"]
zstd_level = 9

[prep.files]
hosts = "hosts.csv.gz"

[demo]
reference_year = 2028
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.prep.raw_dir, PathBuf::from("/srv/olympics/raw"));
        assert_eq!(config.prep.processed_dir, PathBuf::from("data/processed"));
        assert_eq!(config.prep.formats, vec![OutputFormat::Parquet]);
        assert_eq!(config.prep.zstd_level, 9);
        assert_eq!(config.prep.files.hosts.as_deref(), Some("hosts.csv.gz"));
        assert_eq!(config.prep.files.results, "olympic_results.csv");
        assert_eq!(config.demo.reference_year, 2028);
        assert_eq!(config.demo.model_name, "regression_baseline_v1");
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("podium.toml");
        std::fs::write(&path, "[prep]\nzstd_level = \"high\"\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("podium.toml"));
    }
}
