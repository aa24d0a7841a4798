//! Run manifest: input and output content hashes of one committed run

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::hash;

/// Bumped whenever the processed schema changes.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Hash of one input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDigest {
    pub path: PathBuf,
    pub blake3: String,
}

/// Manifest stored alongside processed outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub format_version: u32,
    /// Logical dataset name (`results`, `medals`, ...) → digest.
    pub inputs: BTreeMap<String, InputDigest>,
    /// Output filename → full hex blake3 hash.
    pub outputs: BTreeMap<String, String>,
    /// Output filename → row count.
    pub rows: BTreeMap<String, usize>,
    /// Combined hash over all outputs in filename order.
    pub content_hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Verification result for a single output file.
#[derive(Debug, Clone)]
pub struct VerifyResult {
    pub file: String,
    pub expected: String,
    /// `None` when the file is missing.
    pub actual: Option<String>,
}

impl VerifyResult {
    pub fn ok(&self) -> bool {
        self.actual.as_deref() == Some(self.expected.as_str())
    }
}

fn file_name_of(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("path has no file name: {}", path.display()))
}

/// Combined hash of output hashes given in filename order.
fn content_hash_of(ordered: impl IntoIterator<Item = blake3::Hash>) -> blake3::Hash {
    let ordered: Vec<blake3::Hash> = ordered.into_iter().collect();
    if ordered.is_empty() {
        hash::hash_bytes(b"empty")
    } else {
        hash::combine_hashes(&ordered)
    }
}

impl RunManifest {
    /// Hash inputs and outputs of a finished run.
    ///
    /// `outputs` pairs each committed output path with its row count.
    pub fn build(inputs: &[(&str, &Path)], outputs: &[(PathBuf, usize)]) -> Result<Self> {
        let mut input_digests = BTreeMap::new();
        for (name, path) in inputs {
            let h = hash::hash_file(path)
                .with_context(|| format!("failed to hash input {}", path.display()))?;
            input_digests.insert(
                (*name).to_string(),
                InputDigest {
                    path: path.to_path_buf(),
                    blake3: h.to_hex().to_string(),
                },
            );
        }

        let mut output_hashes = BTreeMap::new();
        let mut rows = BTreeMap::new();
        for (path, row_count) in outputs {
            let h = hash::hash_file(path)
                .with_context(|| format!("failed to hash output {}", path.display()))?;
            let name = file_name_of(path)?;
            output_hashes.insert(name.clone(), h);
            rows.insert(name, *row_count);
        }

        let content_hash = content_hash_of(output_hashes.values().copied());
        Ok(Self {
            format_version: CURRENT_FORMAT_VERSION,
            inputs: input_digests,
            outputs: output_hashes
                .into_iter()
                .map(|(k, v)| (k, v.to_hex().to_string()))
                .collect(),
            rows,
            content_hash: content_hash.to_hex().to_string(),
            created_at: chrono::Utc::now(),
        })
    }

    /// Re-hash `outputs` written after the manifest was built, replacing
    /// their entries and the combined hash.
    pub fn record_outputs(&mut self, outputs: &[(PathBuf, usize)]) -> Result<()> {
        for (path, row_count) in outputs {
            let h = hash::hash_file(path)
                .with_context(|| format!("failed to hash output {}", path.display()))?;
            let name = file_name_of(path)?;
            self.outputs.insert(name.clone(), h.to_hex().to_string());
            self.rows.insert(name, *row_count);
        }
        let mut hashes = Vec::with_capacity(self.outputs.len());
        for (file, hex) in &self.outputs {
            let h = blake3::Hash::from_hex(hex)
                .with_context(|| format!("corrupt hash recorded for {file}"))?;
            hashes.push(h);
        }
        self.content_hash = content_hash_of(hashes).to_hex().to_string();
        self.created_at = chrono::Utc::now();
        Ok(())
    }

    /// Write manifest to `dir/manifest.json` (tmp + rename).
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE);
        let tmp = dir.join(format!("{MANIFEST_FILE}.tmp"));
        let json = serde_json::to_string_pretty(self).context("failed to serialize manifest")?;
        std::fs::write(&tmp, json).with_context(|| format!("failed to write {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("failed to move manifest into {}", path.display()))?;
        Ok(path)
    }

    pub fn read_from(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        if manifest.format_version != CURRENT_FORMAT_VERSION {
            log::warn!(
                "{}: format_version {} != current {}",
                path.display(),
                manifest.format_version,
                CURRENT_FORMAT_VERSION
            );
        }
        Ok(manifest)
    }

    /// Re-hash every recorded output under `dir`.
    pub fn verify(&self, dir: &Path) -> Vec<VerifyResult> {
        self.outputs
            .iter()
            .map(|(file, expected)| {
                let actual = hash::hash_file(&dir.join(file))
                    .ok()
                    .map(|h| h.to_hex().to_string());
                VerifyResult {
                    file: file.clone(),
                    expected: expected.clone(),
                    actual,
                }
            })
            .collect()
    }

    pub fn short_content_hash(&self) -> &str {
        &self.content_hash[..8.min(self.content_hash.len())]
    }
}
