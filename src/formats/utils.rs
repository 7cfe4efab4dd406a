//! Bounds-checked readers shared by the container decoders.

use encoding_rs::UTF_16LE;

use crate::error::{QuarantineError, Result};

/// Extension trait for reading little-endian values from untrusted buffers.
pub trait ReadExt {
    fn slice_at(&self, offset: usize, len: usize) -> Result<&[u8]>;
    fn u32_le_at(&self, offset: usize) -> Result<u32>;
    fn u64_le_at(&self, offset: usize) -> Result<u64>;
}

impl ReadExt for [u8] {
    #[inline]
    fn slice_at(&self, offset: usize, len: usize) -> Result<&[u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.get(offset..end))
            .ok_or_else(|| {
                QuarantineError::truncated(offset, len, self.len().saturating_sub(offset))
            })
    }

    #[inline]
    fn u32_le_at(&self, offset: usize) -> Result<u32> {
        let b = self.slice_at(offset, 4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    #[inline]
    fn u64_le_at(&self, offset: usize) -> Result<u64> {
        let b = self.slice_at(offset, 8)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_le_bytes(arr))
    }
}

/// Decodes `bytes` as strict UTF-8. `offset` is only used for error reporting.
pub fn decode_utf8(bytes: &[u8], offset: usize) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| QuarantineError::InvalidString {
            offset,
            encoding: "UTF-8",
        })
}

/// Decodes `bytes` as strict UTF-16LE (odd lengths and lone surrogates fail).
pub fn decode_utf16le(bytes: &[u8], offset: usize) -> Result<String> {
    UTF_16LE
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|s| s.into_owned())
        .ok_or(QuarantineError::InvalidString {
            offset,
            encoding: "UTF-16LE",
        })
}

/// Reads a NUL-terminated 8-bit string starting at `offset`.
///
/// A missing terminator is reported as truncation.
pub fn read_cstring(data: &[u8], offset: usize) -> Result<String> {
    let tail = data
        .get(offset..)
        .ok_or_else(|| QuarantineError::truncated(offset, 1, 0))?;
    let len = memchr::memchr(0, tail)
        .ok_or_else(|| QuarantineError::truncated(offset, tail.len() + 1, tail.len()))?;
    decode_utf8(&tail[..len], offset)
}

/// Reads a UTF-16LE string terminated by a `0x0000` code unit.
///
/// Returns the string and the offset just past the terminator.
pub fn read_utf16le_cstring(data: &[u8], offset: usize) -> Result<(String, usize)> {
    let tail = data
        .get(offset..)
        .ok_or_else(|| QuarantineError::truncated(offset, 2, 0))?;
    let units = tail
        .chunks_exact(2)
        .position(|unit| unit == [0, 0])
        .ok_or_else(|| {
            QuarantineError::truncated(offset, tail.len() - tail.len() % 2 + 2, tail.len())
        })?;
    let byte_len = units * 2;
    let s = decode_utf16le(&tail[..byte_len], offset)?;
    Ok((s, offset + byte_len + 2))
}
