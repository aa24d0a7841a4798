//! Errors that abort a preprocessing run before any output is written

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum PrepError {
    /// A required input was found in neither the raw nor the root directory.
    MissingInput {
        dataset: &'static str,
        primary: PathBuf,
        fallback: PathBuf,
    },
    /// An input exists but could not be read as CSV.
    Read { path: PathBuf, source: csv::Error },
}

impl fmt::Display for PrepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput {
                dataset,
                primary,
                fallback,
            } => write!(
                f,
                "missing {dataset} input: looked for {} and {}",
                primary.display(),
                fallback.display()
            ),
            Self::Read { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PrepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingInput { .. } => None,
            Self::Read { source, .. } => Some(source),
        }
    }
}
