//! Unwrapping Avira submissions: a multipart/form-data body whose named part
//! is a zip archive holding the Qua file as its first entry.

use memchr::memmem;
use std::io::{Cursor, Read};
use tracing::{debug, trace};

use crate::error::{QuarantineError, Result};

/// Returns the body of the form part called `name`.
///
/// `boundary` is the boundary parameter of the content type; delimiter lines
/// are `--` followed by it. The CRLF preceding the next delimiter belongs to
/// the delimiter and is not part of the returned body.
pub fn extract_multipart_part<'a>(body: &'a [u8], boundary: &str, name: &str) -> Result<&'a [u8]> {
    let delimiter = format!("--{boundary}");
    let finder = memmem::Finder::new(delimiter.as_bytes());
    let starts: Vec<usize> = finder
        .find_iter(body)
        .filter(|&i| i == 0 || body[i - 1] == b'\n')
        .collect();
    trace!(delimiters = starts.len(), "Scanning multipart body");

    for window in starts.windows(2) {
        let part = &body[window[0] + delimiter.len()..window[1]];
        if part.starts_with(b"--") {
            break;
        }
        // Rest of the delimiter line (transport padding, CRLF).
        let Some(line_end) = memchr::memchr(b'\n', part) else {
            continue;
        };
        let Some((headers, content)) = split_headers(&part[line_end + 1..]) else {
            continue;
        };
        let part_name = disposition_name(headers);
        debug!(part = part_name.as_deref().unwrap_or(""), len = content.len(), "Multipart part");
        if part_name.as_deref() == Some(name) {
            let content = content
                .strip_suffix(b"\r\n")
                .or_else(|| content.strip_suffix(b"\n"))
                .unwrap_or(content);
            return Ok(content);
        }
    }

    Err(QuarantineError::Envelope(format!(
        "no multipart part named {name:?}"
    )))
}

fn split_headers(part: &[u8]) -> Option<(&[u8], &[u8])> {
    if let Some(rest) = part.strip_prefix(b"\r\n") {
        return Some((&[][..], rest));
    }
    if let Some(i) = memmem::find(part, b"\r\n\r\n") {
        return Some((&part[..i], &part[i + 4..]));
    }
    memmem::find(part, b"\n\n").map(|i| (&part[..i], &part[i + 2..]))
}

// `name` parameter of the Content-Disposition header.
fn disposition_name(headers: &[u8]) -> Option<String> {
    let headers = String::from_utf8_lossy(headers);
    headers.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case("content-disposition") {
            return None;
        }
        value.split(';').skip(1).find_map(|param| {
            let (k, v) = param.split_once('=')?;
            k.trim()
                .eq_ignore_ascii_case("name")
                .then(|| v.trim().trim_matches('"').to_string())
        })
    })
}

/// Returns the contents of the first entry of a zip archive.
///
/// Entries larger than `max_size` bytes are rejected.
pub fn unzip_first_entry(archive: &[u8], max_size: u64) -> Result<Vec<u8>> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))
        .map_err(|e| QuarantineError::Envelope(format!("invalid zip archive: {e}")))?;
    if zip.is_empty() {
        return Err(QuarantineError::Envelope("zip archive is empty".to_string()));
    }
    let mut entry = zip
        .by_index(0)
        .map_err(|e| QuarantineError::Envelope(format!("cannot open first zip entry: {e}")))?;
    if entry.size() > max_size {
        return Err(QuarantineError::Envelope(format!(
            "zip entry {} declares {} bytes, limit is {max_size}",
            entry.name(),
            entry.size()
        )));
    }
    debug!(entry = entry.name(), size = entry.size(), "Unzipping Qua entry");

    let mut out = Vec::new();
    entry.by_ref().take(max_size + 1).read_to_end(&mut out)?;
    if out.len() as u64 > max_size {
        return Err(QuarantineError::Envelope(format!(
            "zip entry exceeds {max_size} bytes"
        )));
    }
    Ok(out)
}
