//! Avira `AntiVir Qua` quarantine files.
//!
//! Layout (all offsets absolute):
//!
//! | Offset | Content                                           |
//! |--------|---------------------------------------------------|
//! | 0x00   | ASCII `AntiVir Qua`                               |
//! | 0x10   | u32 LE offset of the encrypted sample             |
//! | 0x9c   | NUL-terminated ASCII signature                    |
//! | 0xdc   | NUL-terminated UTF-16LE original path, then info  |
//!
//! The sample runs from its offset to the end of the file, XORed with `0xAA`.
//! Submissions wrap the Qua file in a zip inside a multipart form; see
//! [`envelope`].

pub mod envelope;

use tracing::{debug, info_span, warn};

use crate::cipher::{xor_byte, QUA_XOR_KEY};
use crate::config::ExtractConfig;
use crate::error::{QuarantineError, Result};
use crate::formats::utils::{read_cstring, read_utf16le_cstring, ReadExt};
use crate::record::{Record, RecordKind, Sample, Vendor};

/// Leading bytes of every Qua file.
pub const QUA_MAGIC: &[u8; 11] = b"AntiVir Qua";

const SAMPLE_OFFSET_POS: usize = 0x10;
const SIGNATURE_POS: usize = 0x9c;
const PATH_POS: usize = 0xdc;
const DEVICE_PREFIX: &str = "\\\\.\\";

pub fn has_magic(data: &[u8]) -> bool {
    data.starts_with(QUA_MAGIC)
}

/// Decodes a Qua file. The sample stays encrypted.
pub fn decode(data: &[u8]) -> Result<Record> {
    let span = info_span!("qua_decode", len = data.len());
    let _guard = span.enter();

    if !has_magic(data) {
        return Err(QuarantineError::InvalidFormat {
            format: "Avira Qua",
            reason: "missing \"AntiVir Qua\" magic".to_string(),
        });
    }

    let sample_pos = data.u32_le_at(SAMPLE_OFFSET_POS)? as usize;
    let signature = read_cstring(data, SIGNATURE_POS)?;
    // The info string follows the path's terminator, before any prefix is stripped.
    let (path, info_pos) = read_utf16le_cstring(data, PATH_POS)?;
    let (info, _) = read_utf16le_cstring(data, info_pos)?;
    let path = match path.strip_prefix(DEVICE_PREFIX) {
        Some(stripped) => stripped.to_string(),
        None => path,
    };

    let ciphertext = data.get(sample_pos..).unwrap_or_else(|| {
        warn!(
            sample_pos,
            len = data.len(),
            "Sample offset past end of file, sample is empty"
        );
        &[][..]
    });

    debug!(
        signature = %signature,
        path = %path,
        sample_len = ciphertext.len(),
        "Decoded Qua file"
    );

    let mut record = Record::new(Vendor::Avira);
    record.kind = RecordKind::Submit;
    record.signature = Some(signature);
    record.path = Some(path);
    record.info = Some(info);
    record.sample = Some(Sample::Encrypted(ciphertext.to_vec()));
    Ok(record)
}

/// Decrypts the sample of a decoded Qua record in place.
pub fn decrypt_record(record: &mut Record) {
    record.decrypt_sample_with(|ciphertext| xor_byte(ciphertext, QUA_XOR_KEY));
}

/// Decodes a Qua file and decrypts its sample.
pub fn extract(data: &[u8]) -> Result<Record> {
    let mut record = decode(data)?;
    decrypt_record(&mut record);
    Ok(record)
}

/// Unwraps a multipart submission body (form part -> zip -> Qua) and extracts it.
pub fn decode_submission(body: &[u8], config: &ExtractConfig) -> Result<Record> {
    let archive =
        envelope::extract_multipart_part(body, &config.multipart_boundary, &config.multipart_part)?;
    let qua = envelope::unzip_first_entry(archive, config.max_archive_entry_size)?;
    extract(&qua)
}
