//! AVG/Avast quarantine submission containers.
//!
//! A container is the 4-byte magic `A1 A5 70 00` followed by TLV fields
//! (see [`fields`]). The record is assembled from the field stream; for
//! submissions the `DATA` payload is the sample, XOR-encrypted with the
//! vendor keystream.

pub mod fields;
pub mod meta;

use tracing::{debug, info_span};

use crate::cipher::Keystream;
use crate::error::{QuarantineError, Result};
use crate::record::{HashDigest, Record, RecordKind, Sample, Vendor};

pub use fields::{decode_field, DecodeRule, Field, FieldValue, FieldWalker, Tag};
pub use meta::{decode_meta_block, decode_meta_field, MetaBlock};

/// Leading bytes of every AVG/Avast container.
pub const AVAST_MAGIC: [u8; 4] = [0xA1, 0xA5, 0x70, 0x00];

const PATH_PREFIX: &str = "Original file location: ";
const SIGNATURE_PREFIX: &str = "Virus name: ";

pub fn has_magic(data: &[u8]) -> bool {
    data.starts_with(&AVAST_MAGIC)
}

/// Validates the magic and returns a walker over the container's fields.
pub fn walk_fields(data: &[u8]) -> Result<FieldWalker<'_>> {
    if !has_magic(data) {
        return Err(QuarantineError::InvalidFormat {
            format: "AVG/Avast",
            reason: format!(
                "expected magic a1a57000, found {}",
                hex::encode(&data[..data.len().min(4)])
            ),
        });
    }
    Ok(FieldWalker::new(data, AVAST_MAGIC.len()))
}

/// Decodes a container into a record. A submit sample stays encrypted.
///
/// A record whose `TYPE` is missing or unrecognized comes back as
/// [`RecordKind::Unknown`]; only submit records keep their sample.
pub fn decode(data: &[u8]) -> Result<Record> {
    let span = info_span!("avast_decode", len = data.len());
    let _guard = span.enter();

    let mut record = Record::new(Vendor::AvastAvg);
    for field in walk_fields(data)? {
        apply_field(&mut record, field?)?;
    }

    if record.kind != RecordKind::Submit {
        record.sample = None;
    }

    debug!(
        kind = %record.kind,
        has_sample = record.sample.is_some(),
        signature = record.signature.as_deref().unwrap_or(""),
        "Decoded AVG/Avast container"
    );
    Ok(record)
}

/// Decrypts the sample of a decoded record in place.
pub fn decrypt_record(record: &mut Record, keystream: &Keystream, chunk_size: usize) {
    record.decrypt_sample_with(|ciphertext| keystream.apply_chunked(ciphertext, chunk_size));
}

/// Decodes a container and decrypts its sample, if any.
pub fn extract(data: &[u8], keystream: &Keystream) -> Result<Record> {
    let mut record = decode(data)?;
    decrypt_record(&mut record, keystream, crate::cipher::DEFAULT_CHUNK_SIZE);
    Ok(record)
}

fn apply_field(record: &mut Record, field: Field<'_>) -> Result<()> {
    match (field.tag, field.value) {
        (Tag::Data, FieldValue::Raw(payload)) => {
            if record.sample.is_none() {
                record.sample = Some(Sample::Encrypted(payload.to_vec()));
            }
        }
        (Tag::Scoo, FieldValue::Text(text)) => apply_scan_report(record, &text),
        (Tag::Type, FieldValue::Text(text)) => match RecordKind::classify(&text) {
            Some(kind) => record.kind = kind,
            None => debug!(value = %text, "Unrecognized record type"),
        },
        (Tag::Name, FieldValue::Text(text)) => record.name = Some(text),
        (Tag::Viru, FieldValue::Text(text)) => record.raw_signature = Some(text),
        (Tag::Meta, FieldValue::Text(text)) => {
            let meta = decode_meta_field(&text)?;
            if meta.path.is_some() {
                record.meta_path = meta.path;
            }
            if meta.hash.is_some() {
                record.meta_hash = meta.hash;
            }
        }
        (Tag::Htyp, FieldValue::Hash { algorithm, digest }) => {
            record.hash = Some(HashDigest::new(algorithm, digest));
        }
        _ => {}
    }
    Ok(())
}

// The SCOO report is free text: labelled lines for path and signature, and
// the OS description on its last line.
fn apply_scan_report(record: &mut Record, text: &str) {
    let mut last = None;
    for line in split_lines(text) {
        if let Some(path) = line.strip_prefix(PATH_PREFIX) {
            record.path = Some(path.to_string());
        } else if let Some(signature) = line.strip_prefix(SIGNATURE_PREFIX) {
            record.signature = Some(signature.to_string());
        }
        last = Some(line);
    }
    if let Some(line) = last {
        record.os = Some(line.trim().to_string());
    }
}

// Line boundaries of the agent's report text: CR, LF, CRLF, VT, FF, the
// ASCII file/group/record separators, NEL, LS and PS.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Splits `text` into lines without their terminators. A trailing line
/// break does not produce an empty final line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}
