//! Staging of processed tables in every configured format

use std::io;
use std::path::{Path, PathBuf};

use podium_core::{CsvSink, ParquetSink, StagedFile, commit_all};
use serde::Serialize;

use crate::config::OutputFormat;
use crate::schema;
use crate::transform::{BATCH_SIZE, TableAccumulator};

pub const FULL_STEM: &str = "olympic_full";
pub const SUMMARY_STEM: &str = "country_year_summary";
pub const FEATURES_STEM: &str = "country_features";

/// Output location of `stem` in `format`.
pub fn output_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{stem}.{}", format.extension()))
}

/// Write `rows` to tmp files next to their final paths, one per format.
/// Nothing is visible under the final names until the staged files are
/// committed.
pub fn stage_table<A>(
    dir: &Path,
    stem: &str,
    rows: &[A::Row],
    formats: &[OutputFormat],
    zstd_level: i32,
) -> io::Result<Vec<StagedFile>>
where
    A: TableAccumulator,
    A::Row: Serialize,
{
    let mut staged = Vec::with_capacity(formats.len());
    for &format in formats {
        let path = output_path(dir, stem, format);
        let file = match format {
            OutputFormat::Csv => {
                let mut sink = CsvSink::create(&path, schema::column_names(A::schema()))?;
                for row in rows {
                    sink.write_row(row)?;
                }
                sink.finish()?
            }
            OutputFormat::Parquet => {
                let mut sink = ParquetSink::create(&path, A::schema(), zstd_level)?;
                let mut acc = A::default();
                for chunk in rows.chunks(BATCH_SIZE) {
                    for row in chunk {
                        acc.push(row);
                    }
                    let batch = acc.take_batch().map_err(io::Error::other)?;
                    sink.write_batch(&batch)?;
                }
                sink.finish()?
            }
        };
        log::debug!("Staged {} rows for {}", file.rows(), path.display());
        staged.push(file);
    }
    Ok(staged)
}

/// Commit staged files, pairing each final path with its row count.
pub fn commit(staged: Vec<StagedFile>) -> io::Result<Vec<(PathBuf, usize)>> {
    let rows: Vec<usize> = staged.iter().map(StagedFile::rows).collect();
    let paths = commit_all(staged)?;
    Ok(paths.into_iter().zip(rows).collect())
}
