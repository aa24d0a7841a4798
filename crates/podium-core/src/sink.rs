//! Output sinks: Parquet and CSV writers staged as `*.tmp` files
//!
//! A sink never touches its final path while writing. `finish` closes the
//! writer and returns a [`StagedFile`]; [`commit_all`] renames a whole set of
//! staged files into place once every one of them has been written. A staged
//! file that is dropped without being committed removes its tmp file, so a
//! failed run leaves previous outputs untouched.
//!
//! During a commit, replaced outputs are parked as `*.bak` until every rename
//! has succeeded. A failed rename restores them, and [`cleanup_tmp_files`]
//! restores any left behind by a crash mid-commit.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::RecordBatch;
use arrow::datatypes::Schema;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use serde::Serialize;

fn with_suffix(final_path: &Path, suffix: &str) -> PathBuf {
    let mut name = final_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    final_path.with_file_name(name)
}

fn tmp_path_for(final_path: &Path) -> PathBuf {
    with_suffix(final_path, ".tmp")
}

fn bak_path_for(final_path: &Path) -> PathBuf {
    with_suffix(final_path, ".bak")
}

/// Fresh tmp file for `final_path`, replacing a stale one.
fn create_tmp(final_path: &Path) -> io::Result<(PathBuf, File)> {
    let tmp_path = tmp_path_for(final_path);
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)?;
    }
    let file = File::create(&tmp_path)?;
    Ok((tmp_path, file))
}

/// A fully written output waiting to be renamed into place.
#[derive(Debug)]
pub struct StagedFile {
    tmp_path: PathBuf,
    final_path: PathBuf,
    rows: usize,
    committed: bool,
}

impl StagedFile {
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Rename tmp → final.
    pub fn commit(mut self) -> io::Result<PathBuf> {
        fs::rename(&self.tmp_path, &self.final_path)?;
        self.committed = true;
        Ok(self.final_path.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.committed && self.tmp_path.exists() {
            log::debug!("Discarding staged file {}", self.tmp_path.display());
            let _ = fs::remove_file(&self.tmp_path);
        }
    }
}

/// Commit every staged file as a set. Returns the final paths.
///
/// Either every final path holds its new content, or (on error) every final
/// path holds what it held before the call.
pub fn commit_all(files: Vec<StagedFile>) -> io::Result<Vec<PathBuf>> {
    // Final paths parked aside, paired with their backup
    let mut parked: Vec<(PathBuf, PathBuf)> = Vec::new();
    for file in &files {
        let final_path = file.final_path();
        if final_path.exists() {
            let bak = bak_path_for(final_path);
            if let Err(e) = fs::rename(final_path, &bak) {
                restore(&parked, &[]);
                return Err(e);
            }
            parked.push((final_path.to_path_buf(), bak));
        }
    }

    let mut committed = Vec::with_capacity(files.len());
    for file in files {
        match file.commit() {
            Ok(path) => committed.push(path),
            Err(e) => {
                restore(&parked, &committed);
                return Err(e);
            }
        }
    }

    for (_, bak) in &parked {
        if let Err(e) = fs::remove_file(bak) {
            log::warn!("Failed to remove backup {}: {e}", bak.display());
        }
    }
    Ok(committed)
}

/// Undo a partial commit: drop new finals, then move backups back.
fn restore(parked: &[(PathBuf, PathBuf)], committed: &[PathBuf]) {
    for path in committed {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("Failed to remove {}: {e}", path.display());
        }
    }
    for (final_path, bak) in parked {
        if let Err(e) = fs::rename(bak, final_path) {
            log::error!(
                "Failed to restore {} from {}: {e}",
                final_path.display(),
                bak.display()
            );
        }
    }
}

/// Parquet writer (zstd) staged to a tmp file
pub struct ParquetSink {
    writer: ArrowWriter<File>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    row_count: usize,
}

impl std::fmt::Debug for ParquetSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParquetSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl ParquetSink {
    pub fn create(final_path: &Path, schema: &Schema, zstd_level: i32) -> io::Result<Self> {
        let (tmp_path, file) = create_tmp(final_path)?;
        let level = ZstdLevel::try_new(zstd_level)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let props = WriterProperties::builder()
            .set_compression(Compression::ZSTD(level))
            .set_max_row_group_size(1024 * 1024)
            .build();

        let writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))
            .map_err(io::Error::other)?;

        Ok(Self {
            writer,
            tmp_path,
            final_path: final_path.to_path_buf(),
            row_count: 0,
        })
    }

    pub fn write_batch(&mut self, batch: &RecordBatch) -> io::Result<()> {
        self.row_count += batch.num_rows();
        self.writer.write(batch).map_err(io::Error::other)
    }

    /// Write the footer and hand over the staged file.
    pub fn finish(self) -> io::Result<StagedFile> {
        self.writer.close().map_err(io::Error::other)?;
        Ok(StagedFile {
            tmp_path: self.tmp_path,
            final_path: self.final_path,
            rows: self.row_count,
            committed: false,
        })
    }
}

/// CSV writer staged to a tmp file.
///
/// The header is written up front from `columns`, so an empty table still
/// produces a header line. Rows are serialized positionally and must list
/// their fields in the same order.
pub struct CsvSink {
    writer: csv::Writer<BufWriter<File>>,
    tmp_path: PathBuf,
    final_path: PathBuf,
    row_count: usize,
}

impl std::fmt::Debug for CsvSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvSink")
            .field("final_path", &self.final_path)
            .field("row_count", &self.row_count)
            .finish_non_exhaustive()
    }
}

impl CsvSink {
    pub fn create<I, S>(final_path: &Path, columns: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let (tmp_path, file) = create_tmp(final_path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));
        writer.write_record(columns).map_err(io::Error::other)?;
        Ok(Self {
            writer,
            tmp_path,
            final_path: final_path.to_path_buf(),
            row_count: 0,
        })
    }

    pub fn write_row<T: Serialize>(&mut self, row: &T) -> io::Result<()> {
        self.row_count += 1;
        self.writer.serialize(row).map_err(io::Error::other)
    }

    pub fn finish(mut self) -> io::Result<StagedFile> {
        self.writer.flush()?;
        Ok(StagedFile {
            tmp_path: self.tmp_path,
            final_path: self.final_path,
            rows: self.row_count,
            committed: false,
        })
    }
}

/// Serialize `payload` as JSON to `path` via tmp file + rename.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, payload: &T) -> io::Result<()> {
    let (tmp_path, file) = create_tmp(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, payload).map_err(io::Error::other)?;
    writer.flush()?;
    drop(writer);
    fs::rename(&tmp_path, path)
}

/// Remove stale .tmp files left in `dir` by an interrupted run, and put
/// `.bak` files from an interrupted commit back in place
pub fn cleanup_tmp_files(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "tmp") {
            log::warn!("Removing stale tmp file: {}", path.display());
            fs::remove_file(&path)?;
        } else if path.extension().is_some_and(|ext| ext == "bak") {
            let final_path = path.with_extension("");
            log::warn!("Restoring {} from interrupted commit", final_path.display());
            fs::rename(&path, &final_path)?;
        }
    }
    Ok(())
}
