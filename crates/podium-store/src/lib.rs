//! podium-store: content hashes for pipeline inputs and outputs
//!
//! Every committed run writes a `manifest.json` next to its outputs that
//! records blake3 hashes of the raw inputs and of each processed file.
//! Two runs over the same inputs must produce the same content hash.

pub mod hash;
pub mod manifest;

pub use hash::{combine_hashes, hash_bytes, hash_file};
pub use manifest::{CURRENT_FORMAT_VERSION, MANIFEST_FILE, RunManifest, VerifyResult};
