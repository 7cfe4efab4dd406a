//! The AVG/Avast keystream resource.
//!
//! The keystream is a fixed vendor secret shipped as a sidecar file. It is
//! loaded at most once per process through [`Keystream::shared`] and never
//! mutated afterwards; callers that manage the bytes themselves can build a
//! [`Keystream`] directly and inject it.

use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{QuarantineError, Result};

static SHARED: OnceCell<Keystream> = OnceCell::new();

/// An immutable, non-empty keystream. Cloning shares the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystream {
    bytes: Arc<[u8]>,
}

impl Keystream {
    /// Wraps `bytes`, rejecting an empty keystream.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(QuarantineError::Keystream("keystream is empty".to_string()));
        }
        Ok(Self {
            bytes: Arc::from(bytes),
        })
    }

    /// Reads the keystream file in full.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            QuarantineError::Keystream(format!("cannot read {}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), len = bytes.len(), "Loaded keystream");
        Self::new(bytes)
    }

    /// Process-wide keystream, loaded from `path` on first use.
    ///
    /// Later calls return the cached keystream regardless of `path`. A failed
    /// load is not cached, so a later call may retry once the file exists.
    pub fn shared<P: AsRef<Path>>(path: P) -> Result<&'static Keystream> {
        SHARED.get_or_try_init(|| {
            let keystream = Self::load(path.as_ref())?;
            info!(
                path = %path.as_ref().display(),
                len = keystream.len(),
                "Cached process-wide keystream"
            );
            Ok(keystream)
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; construction rejects empty keystreams.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Encrypts or decrypts `data`.
    pub fn apply(&self, data: &[u8]) -> Vec<u8> {
        super::decrypt(data, &self.bytes)
    }

    pub fn apply_chunked(&self, data: &[u8], chunk_size: usize) -> Vec<u8> {
        super::decrypt_chunked(data, &self.bytes, chunk_size)
    }
}
