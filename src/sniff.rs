//! Magic-based detection of quarantine containers and their envelopes.

use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::formats::{avast, avira};

const ZIP_LOCAL_HEADER: &[u8; 4] = b"PK\x03\x04";

/// What a buffer looks like before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    /// AVG/Avast TLV container.
    AvastAvg,
    /// Bare Avira Qua file.
    AviraQua,
    /// Zip archive, expected to hold a Qua file.
    Zip,
    /// Multipart submission body wrapping a zipped Qua file.
    Multipart,
    Unknown,
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContainerFormat::AvastAvg => "avast_avg",
            ContainerFormat::AviraQua => "avira_qua",
            ContainerFormat::Zip => "zip",
            ContainerFormat::Multipart => "multipart",
            ContainerFormat::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Classifies `data` by its leading bytes.
///
/// `multipart_boundary` is the boundary parameter; a body counts as multipart
/// when its first non-blank line is the corresponding delimiter.
pub fn detect(data: &[u8], multipart_boundary: &str) -> ContainerFormat {
    let format = if avast::has_magic(data) {
        ContainerFormat::AvastAvg
    } else if avira::has_magic(data) {
        ContainerFormat::AviraQua
    } else if data.starts_with(ZIP_LOCAL_HEADER) {
        ContainerFormat::Zip
    } else if is_multipart(data, multipart_boundary) {
        ContainerFormat::Multipart
    } else {
        ContainerFormat::Unknown
    };
    debug!(%format, len = data.len(), "Sniffed container");
    format
}

fn is_multipart(data: &[u8], boundary: &str) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let rest = &data[start..];
    rest.starts_with(b"--") && rest[2..].starts_with(boundary.as_bytes())
}
