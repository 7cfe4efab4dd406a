//! Tag-length-value fields of AVG/Avast containers.
//!
//! Every field is `{tag: [u8; 4], size: u32 LE, payload}`. The tag selects a
//! [`DecodeRule`]; unknown tags (including `DATA`) are kept as raw bytes.

use std::fmt;
use tracing::trace;

use crate::error::{QuarantineError, Result};
use crate::formats::utils::{decode_utf16le, decode_utf8, ReadExt};

/// Bytes of the `{tag, size}` header preceding every payload.
pub const FIELD_HEADER_LEN: usize = 8;

/// Known field tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Name,
    Type,
    Desc,
    Viru,
    Scoo,
    Emai,
    Usid,
    Meta,
    Guid,
    Unid,
    Htyp,
    Size,
    Data,
    Other([u8; 4]),
}

/// How a field payload is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeRule {
    /// UTF-16LE text; the trailing 2-byte NUL is excluded.
    Utf16Text,
    /// UTF-8 text over the whole payload.
    Utf8Text,
    /// `(algorithm, digest)` with the nested length layout of `HTYP`.
    HashDescriptor,
    /// Little-endian integer of width 4 or 8.
    Integer,
    /// Payload kept verbatim.
    Raw,
}

impl Tag {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        match &bytes {
            b"NAME" => Tag::Name,
            b"TYPE" => Tag::Type,
            b"DESC" => Tag::Desc,
            b"VIRU" => Tag::Viru,
            b"SCOO" => Tag::Scoo,
            b"EMAI" => Tag::Emai,
            b"USID" => Tag::Usid,
            b"META" => Tag::Meta,
            b"GUID" => Tag::Guid,
            b"UNID" => Tag::Unid,
            b"HTYP" => Tag::Htyp,
            b"SIZE" => Tag::Size,
            b"DATA" => Tag::Data,
            _ => Tag::Other(bytes),
        }
    }

    pub fn as_bytes(&self) -> [u8; 4] {
        match self {
            Tag::Name => *b"NAME",
            Tag::Type => *b"TYPE",
            Tag::Desc => *b"DESC",
            Tag::Viru => *b"VIRU",
            Tag::Scoo => *b"SCOO",
            Tag::Emai => *b"EMAI",
            Tag::Usid => *b"USID",
            Tag::Meta => *b"META",
            Tag::Guid => *b"GUID",
            Tag::Unid => *b"UNID",
            Tag::Htyp => *b"HTYP",
            Tag::Size => *b"SIZE",
            Tag::Data => *b"DATA",
            Tag::Other(b) => *b,
        }
    }

    pub fn rule(&self) -> DecodeRule {
        match self {
            Tag::Name
            | Tag::Type
            | Tag::Desc
            | Tag::Viru
            | Tag::Scoo
            | Tag::Emai
            | Tag::Usid
            | Tag::Meta => DecodeRule::Utf16Text,
            Tag::Guid | Tag::Unid => DecodeRule::Utf8Text,
            Tag::Htyp => DecodeRule::HashDescriptor,
            Tag::Size => DecodeRule::Integer,
            Tag::Data | Tag::Other(_) => DecodeRule::Raw,
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.as_bytes()))
    }
}

/// Decoded payload of a field. Byte values borrow from the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Text(String),
    Hash { algorithm: String, digest: &'a [u8] },
    U32(u32),
    U64(u64),
    Raw(&'a [u8]),
}

impl FieldValue<'_> {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            FieldValue::U32(v) => Some(u64::from(*v)),
            FieldValue::U64(v) => Some(*v),
            _ => None,
        }
    }
}

/// One decoded field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field<'a> {
    pub tag: Tag,
    /// Offset of the tag within the container.
    pub offset: usize,
    /// The size stored in the header.
    pub declared_size: u32,
    /// Bytes this field occupies, header included.
    pub consumed: usize,
    pub value: FieldValue<'a>,
}

/// Decodes the field whose header starts at `offset`.
///
/// `HTYP` consumes more than it declares: its name spans `size + 4` bytes
/// (swallowing a secondary length), then a 4-byte hash length `h_len` and the
/// hash itself follow, for `8 + size + 8 + h_len` bytes in total.
pub fn decode_field(data: &[u8], offset: usize) -> Result<Field<'_>> {
    let mut tag = [0u8; 4];
    tag.copy_from_slice(data.slice_at(offset, 4)?);
    let tag = Tag::from_bytes(tag);
    let declared_size = data.u32_le_at(offset + 4)?;
    let size = declared_size as usize;
    let start = offset + FIELD_HEADER_LEN;
    let mut consumed = FIELD_HEADER_LEN + size;

    let value = match tag.rule() {
        DecodeRule::HashDescriptor => {
            let name_len = size + 4;
            let name = decode_utf8(data.slice_at(start, name_len)?, start)?;
            let hash_len = data.u32_le_at(start + name_len)? as usize;
            let digest = data.slice_at(start + name_len + 4, hash_len)?;
            consumed = FIELD_HEADER_LEN + size + 8 + hash_len;
            FieldValue::Hash {
                algorithm: name,
                digest,
            }
        }
        rule => {
            let payload = data.slice_at(start, size)?;
            match rule {
                DecodeRule::Utf16Text => {
                    FieldValue::Text(decode_utf16le(&payload[..size.saturating_sub(2)], start)?)
                }
                DecodeRule::Utf8Text => FieldValue::Text(decode_utf8(payload, start)?),
                DecodeRule::Integer => match size {
                    4 => FieldValue::U32(data.u32_le_at(start)?),
                    8 => FieldValue::U64(data.u64_le_at(start)?),
                    _ => {
                        return Err(QuarantineError::UnsupportedField {
                            tag: tag.to_string(),
                            size: declared_size,
                        })
                    }
                },
                _ => FieldValue::Raw(payload),
            }
        }
    };

    trace!(%tag, offset, declared_size, consumed, "Decoded field");

    Ok(Field {
        tag,
        offset,
        declared_size,
        consumed,
        value,
    })
}

/// Lazy walk over the fields following the magic.
///
/// Yields fields until the buffer is exhausted. The first error is yielded
/// once and ends the walk. A clone continues from the same position; build a
/// new walker with [`FieldWalker::new`] to walk again from the start.
#[derive(Debug, Clone)]
pub struct FieldWalker<'a> {
    data: &'a [u8],
    pos: usize,
    failed: bool,
}

impl<'a> FieldWalker<'a> {
    /// Walks `data` starting at `start`, normally just past the magic.
    pub fn new(data: &'a [u8], start: usize) -> Self {
        Self {
            data,
            pos: start,
            failed: false,
        }
    }

    /// Offset of the next field header.
    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for FieldWalker<'a> {
    type Item = Result<Field<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.data.len() {
            return None;
        }
        match decode_field(self.data, self.pos) {
            Ok(field) => {
                self.pos += field.consumed;
                Some(Ok(field))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
