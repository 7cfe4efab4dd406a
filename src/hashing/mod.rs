//! Digest helpers for recovered samples.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of `data` as lowercase hex.
pub fn sha256_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
