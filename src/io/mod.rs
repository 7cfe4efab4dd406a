//! Bounded reading of container files.
//!
//! Containers arrive from endpoint agents and submission portals, so their
//! size is untrusted. `SafeReader` memory-maps the file, refuses anything
//! above the configured size, and tracks a total read budget.

pub mod error;

use crate::io::error::{IoError, Result};
use bytes::Bytes;
use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Resource limits applied when reading a container from disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IOLimits {
    /// The largest container file that will be opened.
    pub max_file_size: u64,
    /// Total bytes that may be read from one container across all reads.
    pub max_read_bytes: u64,
}

impl Default for IOLimits {
    fn default() -> Self {
        Self {
            max_file_size: 256 * 1024 * 1024, // 256MB
            max_read_bytes: 256 * 1024 * 1024,
        }
    }
}

/// A memory-mapped container file with enforced limits.
pub struct SafeReader {
    path: PathBuf,
    // None for empty files; memmap cannot map them.
    mmap: Option<Mmap>,
    limits: IOLimits,
    bytes_read: u64,
    file_size: u64,
}

impl SafeReader {
    /// Opens and maps `path`, failing if it exceeds `limits.max_file_size`.
    pub fn open<P: AsRef<Path>>(path: P, limits: IOLimits) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();

        debug!(
            path = %path.display(),
            size = file_size,
            limit = limits.max_file_size,
            "Opening container"
        );

        if file_size > limits.max_file_size {
            warn!(
                path = %path.display(),
                size = file_size,
                limit = limits.max_file_size,
                "Container is too large"
            );
            return Err(IoError::FileTooLarge {
                limit: limits.max_file_size,
                found: file_size,
            });
        }

        let mmap = if file_size == 0 {
            None
        } else {
            // Safety: read-only map of a regular file we just opened.
            Some(unsafe { Mmap::map(&file)? })
        };

        Ok(Self {
            path: path.to_path_buf(),
            mmap,
            limits,
            bytes_read: 0,
            file_size,
        })
    }

    pub fn size(&self) -> u64 {
        self.file_size
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Reads up to `len` bytes at `offset`, clamped to the end of the file.
    ///
    /// # Errors
    ///
    /// Returns `IoError::ReadLimitExceeded` when the read would push the
    /// total past `limits.max_read_bytes`; the budget is left untouched.
    pub fn read_at(&mut self, offset: u64, len: u64) -> Result<Bytes> {
        if self.bytes_read.saturating_add(len) > self.limits.max_read_bytes {
            warn!(
                path = %self.path.display(),
                current = self.bytes_read,
                requested = len,
                limit = self.limits.max_read_bytes,
                "Read budget exceeded"
            );
            return Err(IoError::ReadLimitExceeded {
                limit: self.limits.max_read_bytes,
                current: self.bytes_read,
                requested: len,
            });
        }

        let map = match &self.mmap {
            Some(m) => m,
            None => return Ok(Bytes::new()),
        };

        let offset = offset as usize;
        if offset >= map.len() {
            return Ok(Bytes::new());
        }
        let end = offset.saturating_add(len as usize).min(map.len());
        let out = Bytes::copy_from_slice(&map[offset..end]);
        self.bytes_read += out.len() as u64;

        trace!(
            path = %self.path.display(),
            offset,
            len = out.len(),
            total_read = self.bytes_read,
            "Read container bytes"
        );

        Ok(out)
    }

    /// Reads the whole container. Decoders need random access to all of it.
    pub fn read_all(&mut self) -> Result<Bytes> {
        self.read_at(0, self.file_size)
    }
}
