//! Repeating-keystream XOR cipher used by both quarantine formats.
//!
//! AVG/Avast containers XOR the sample with a vendor keystream that repeats
//! over the whole payload; Avira Qua files use a one-byte key. The transform
//! is its own inverse.

pub mod keystream;

pub use keystream::Keystream;

/// Single-byte key of the Avira Qua format.
pub const QUA_XOR_KEY: u8 = 0xAA;

/// Default block size of the XOR loop.
pub const DEFAULT_CHUNK_SIZE: usize = 0x10000;

/// XORs `data` with `keystream`, cycling the keystream by absolute offset.
///
/// An empty keystream leaves the data unchanged.
pub fn decrypt(data: &[u8], keystream: &[u8]) -> Vec<u8> {
    decrypt_chunked(data, keystream, DEFAULT_CHUNK_SIZE)
}

/// Same as [`decrypt`], processing `chunk_size` bytes per block.
///
/// The keystream position depends only on the absolute offset into `data`,
/// so the output is identical for every chunk size.
pub fn decrypt_chunked(data: &[u8], keystream: &[u8], chunk_size: usize) -> Vec<u8> {
    if keystream.is_empty() {
        return data.to_vec();
    }
    let chunk_size = chunk_size.max(1);
    let mut out = Vec::with_capacity(data.len());
    for (index, chunk) in data.chunks(chunk_size).enumerate() {
        let start = (index * chunk_size) % keystream.len();
        let key = keystream.iter().cycle().skip(start);
        out.extend(chunk.iter().zip(key).map(|(b, k)| b ^ k));
    }
    out
}

/// XORs every byte of `data` with `key`.
pub fn xor_byte(data: &[u8], key: u8) -> Vec<u8> {
    data.iter().map(|b| b ^ key).collect()
}
