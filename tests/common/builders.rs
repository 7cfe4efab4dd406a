//! Builders for synthetic quarantine containers.

use std::io::{Cursor, Write};

use base64::Engine;
use unquarantine::cipher::{xor_byte, QUA_XOR_KEY};
use unquarantine::formats::avast::AVAST_MAGIC;
use unquarantine::formats::avira::QUA_MAGIC;

/// Encodes `s` as UTF-16LE followed by a NUL code unit.
pub fn utf16z(s: &str) -> Vec<u8> {
    let mut out: Vec<u8> = s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    out.extend_from_slice(&[0, 0]);
    out
}

/// A raw `{tag, size, payload}` field.
pub fn field(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = tag.to_vec();
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// A UTF-16LE text field.
pub fn text_field(tag: &[u8; 4], s: &str) -> Vec<u8> {
    field(tag, &utf16z(s))
}

/// An `HTYP` field laid out the way the agent writes it: the declared size
/// covers the algorithm name minus the four bytes of the secondary length.
pub fn htyp_field(algorithm: &[u8], digest: &[u8]) -> Vec<u8> {
    assert!(algorithm.len() >= 4);
    let mut out = b"HTYP".to_vec();
    out.extend_from_slice(&((algorithm.len() - 4) as u32).to_le_bytes());
    out.extend_from_slice(algorithm);
    out.extend_from_slice(&(digest.len() as u32).to_le_bytes());
    out.extend_from_slice(digest);
    out
}

/// A meta block entry `{type, length, payload}`.
pub fn meta_entry(entry_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut out = entry_type.to_le_bytes().to_vec();
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// A `META` field wrapping `block` as `v1|<base64>|end`.
pub fn meta_field(block: &[u8]) -> Vec<u8> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(block);
    text_field(b"META", &format!("v1|{encoded}|end"))
}

/// Magic followed by `fields`.
pub fn avast_container(fields: &[Vec<u8>]) -> Vec<u8> {
    let mut out = AVAST_MAGIC.to_vec();
    for f in fields {
        out.extend_from_slice(f);
    }
    out
}

/// A Qua file whose sample region starts at `sample_pos`.
///
/// The encrypted plaintext is laid down first and the header fields are
/// written over it, so a small `sample_pos` makes the sample overlap the
/// header the same way the decoder sees it.
pub fn qua_file(signature: &str, path: &str, info: &str, sample_pos: u32, plain: &[u8]) -> Vec<u8> {
    let mut strings = utf16z(path);
    strings.extend(utf16z(info));
    let header_len = (0xdc + strings.len()).max(0x9c + signature.len() + 1);

    let mut data = vec![0u8; sample_pos as usize];
    data.extend(xor_byte(plain, QUA_XOR_KEY));
    if data.len() < header_len {
        data.resize(header_len, 0);
    }
    data[..11].copy_from_slice(QUA_MAGIC);
    data[0x10..0x14].copy_from_slice(&sample_pos.to_le_bytes());
    data[0x9c..0x9c + signature.len()].copy_from_slice(signature.as_bytes());
    data[0x9c + signature.len()] = 0;
    data[0xdc..0xdc + strings.len()].copy_from_slice(&strings);
    data
}

/// A zip archive holding `entries` in order.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, content) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A multipart/form-data body with the given named parts.
pub fn multipart_body(boundary: &str, parts: &[(&str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content) in parts {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
