//! The binary block carried base64-encoded inside the `META` field.
//!
//! The block is a run of `{type: u32 LE, length: u32 LE, payload}` entries.
//! Parsing stops quietly at the first entry that does not fit; whatever was
//! decoded before that point is kept.

use base64::Engine;
use tracing::{debug, trace};

use crate::error::{QuarantineError, Result};
use crate::formats::utils::{decode_utf8, ReadExt};
use crate::record::HashDigest;

/// Entry type holding the NUL-terminated path of the detected file.
pub const META_PATH: u32 = 0x00;
/// Entry type holding the raw SHA-256 of the detected file.
pub const META_SHA256: u32 = 0x19;
/// Algorithm label reported for [`META_SHA256`] entries.
pub const META_HASH_ALGORITHM: &str = "SHA256HASH";

/// Fields recovered from a meta block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetaBlock {
    pub path: Option<String>,
    pub hash: Option<HashDigest>,
}

/// Decodes the text value of a `META` field: `<prefix>|<base64 block>|...`.
pub fn decode_meta_field(value: &str) -> Result<MetaBlock> {
    let encoded = value
        .split('|')
        .nth(1)
        .ok_or_else(|| malformed("missing '|' separated block"))?;
    let encoded: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let blob = base64::engine::general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| malformed(&format!("invalid base64: {e}")))?;
    decode_meta_block(&blob)
}

/// Walks a decoded meta block.
pub fn decode_meta_block(blob: &[u8]) -> Result<MetaBlock> {
    let mut meta = MetaBlock::default();
    let mut pos = 0usize;

    while blob.len() - pos >= 8 {
        let entry_type = blob.u32_le_at(pos)?;
        let len = blob.u32_le_at(pos + 4)? as usize;
        pos += 8;

        let Ok(payload) = blob.slice_at(pos, len) else {
            debug!(
                entry_type,
                len,
                remaining = blob.len() - pos,
                "Meta entry overruns block, stopping"
            );
            break;
        };
        trace!(entry_type, len, offset = pos, "Meta entry");

        match entry_type {
            META_PATH => {
                let text = payload.split_last().map_or(&[][..], |(_, rest)| rest);
                meta.path = Some(decode_utf8(text, pos)?);
            }
            META_SHA256 => {
                meta.hash = Some(HashDigest::new(META_HASH_ALGORITHM, payload));
            }
            _ => {}
        }
        pos += len;
    }

    Ok(meta)
}

fn malformed(reason: &str) -> QuarantineError {
    QuarantineError::MalformedField {
        tag: "META".to_string(),
        reason: reason.to_string(),
    }
}
