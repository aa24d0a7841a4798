//! Demo export settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub demo_dir: PathBuf,
    /// Model predictions CSV (`country_name, slug_game,
    /// predicted_medals_total`); skipped when unset or absent.
    pub predictions: Option<PathBuf>,
    /// Year ages are computed against.
    pub reference_year: i32,
    pub model_name: String,
    pub target: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            demo_dir: PathBuf::from("data/demo"),
            predictions: Some(PathBuf::from("reports/medal_predictions.csv")),
            reference_year: 2024,
            model_name: "regression_baseline_v1".to_string(),
            target: "medals_total".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DemoConfig::default();
        assert_eq!(c.demo_dir, PathBuf::from("data/demo"));
        assert_eq!(c.reference_year, 2024);
        assert_eq!(c.target, "medals_total");
    }
}
