//! Configuration for container extraction.
//!
//! Defaults reproduce the behavior of the vendor tooling; everything is
//! serde-serializable so ingestion pipelines can keep it alongside their
//! own settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;
use crate::io::IOLimits;

/// Environment variable overriding [`ExtractConfig::keystream_path`].
pub const KEYSTREAM_ENV: &str = "UNQUARANTINE_KEYSTREAM";

/// Default sidecar file holding the AVG/Avast keystream.
pub const DEFAULT_KEYSTREAM_FILE: &str = "avg-cipher.bin";

/// Boundary the Avira submission client uses for its multipart bodies.
pub const DEFAULT_MULTIPART_BOUNDARY: &str = "--MULTI-PARTS-FORM-DATA-BOUNDARY";

/// Form part carrying the zipped Qua file.
pub const DEFAULT_MULTIPART_PART: &str = "file_eml";

/// Master configuration for extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Location of the AVG/Avast keystream resource.
    pub keystream_path: PathBuf,
    /// Limits for reading container files from disk.
    pub io: IOLimits,
    /// Block size of the XOR loop (default: 65536). Has no effect on output.
    pub cipher_chunk_size: usize,
    /// Largest zip entry accepted from an Avira submission (default: 100MB).
    pub max_archive_entry_size: u64,
    /// Multipart boundary of Avira submissions.
    pub multipart_boundary: String,
    /// Name of the multipart part holding the zipped Qua file.
    pub multipart_part: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            keystream_path: PathBuf::from(DEFAULT_KEYSTREAM_FILE),
            io: IOLimits::default(),
            cipher_chunk_size: 0x10000,
            max_archive_entry_size: 100 * 1024 * 1024,
            multipart_boundary: DEFAULT_MULTIPART_BOUNDARY.to_string(),
            multipart_part: DEFAULT_MULTIPART_PART.to_string(),
        }
    }
}

impl ExtractConfig {
    /// Defaults, with the keystream path taken from `UNQUARANTINE_KEYSTREAM` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(KEYSTREAM_ENV) {
            config.keystream_path = PathBuf::from(path);
        }
        config
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
