//! Sidecar reports and on-disk output for decoded records.
//!
//! Each extractable record yields one text report next to the recovered
//! sample:
//!
//! - submissions: `<name>.info` plus the sample as `<name>`
//! - detection statistics: `<name>.stat`
//! - heuristic detections: `<name>.heur`
//!
//! `<name>` is the last component of the Windows path the record refers to,
//! optionally prefixed with `<prefix>_`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::record::{HashDigest, Record, RecordKind, Vendor};

/// Name used when a record carries no usable path.
pub const FALLBACK_NAME: &str = "sample";

/// A rendered sidecar report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Output file name without the report extension.
    pub file_name: String,
    /// `info`, `stat` or `heur`.
    pub extension: &'static str,
    pub text: String,
}

impl Report {
    pub fn report_file_name(&self) -> String {
        format!("{}.{}", self.file_name, self.extension)
    }
}

/// Renders the report for `record`, or `None` for unknown records.
pub fn render(record: &Record, prefix: Option<&str>) -> Option<Report> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let hash = |h: &Option<HashDigest>| h.as_ref().map(ToString::to_string).unwrap_or_default();

    let (source, extension, lines): (&Option<String>, _, Vec<(&str, String)>) =
        match (record.vendor, record.kind) {
            (_, RecordKind::Unknown) => return None,
            (Vendor::Avira, _) => (
                &record.path,
                "info",
                vec![
                    ("signature", opt(&record.signature)),
                    ("path", opt(&record.path)),
                    ("info", opt(&record.info)),
                ],
            ),
            (Vendor::AvastAvg, RecordKind::Submit) => (
                &record.path,
                "info",
                vec![
                    ("signature", opt(&record.signature)),
                    ("path", opt(&record.path)),
                    ("hash", hash(&record.hash)),
                    ("os", opt(&record.os)),
                ],
            ),
            (Vendor::AvastAvg, RecordKind::Stat) => (
                &record.name,
                "stat",
                vec![
                    ("signature", opt(&record.raw_signature)),
                    ("path", opt(&record.name)),
                    ("hash", hash(&record.hash)),
                ],
            ),
            (Vendor::AvastAvg, RecordKind::Heuristic) => (
                &record.meta_path,
                "heur",
                vec![
                    ("signature", opt(&record.raw_signature)),
                    ("path", opt(&record.meta_path)),
                    ("hash", hash(&record.meta_hash)),
                ],
            ),
        };

    let mut text = String::new();
    for (key, value) in lines {
        let _ = writeln!(text, "{key}: {value}");
    }

    Some(Report {
        file_name: output_name(source.as_deref(), prefix),
        extension,
        text,
    })
}

/// Derives a safe output file name from a Windows path.
///
/// Only the last `\` or `/` separated component is kept; empty, `.` and `..`
/// components fall back to [`FALLBACK_NAME`].
pub fn output_name(source_path: Option<&str>, prefix: Option<&str>) -> String {
    let base = source_path
        .and_then(|p| p.rsplit(['\\', '/']).next())
        .map(|name| name.trim_matches(char::from(0)))
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .unwrap_or(FALLBACK_NAME);
    match prefix {
        Some(prefix) => format!("{prefix}_{base}"),
        None => base.to_string(),
    }
}

/// Writes the report and, for submissions, the recovered sample into `out_dir`.
///
/// Returns the paths written. Unknown records write nothing; a sample that
/// was never decrypted is skipped rather than written as ciphertext.
pub fn write_outputs<P: AsRef<Path>>(
    record: &Record,
    out_dir: P,
    prefix: Option<&str>,
) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    let Some(report) = render(record, prefix) else {
        debug!(kind = %record.kind, "Nothing to write for record");
        return Ok(Vec::new());
    };

    let mut written = Vec::new();
    let report_path = out_dir.join(report.report_file_name());
    fs::write(&report_path, report.text.as_bytes())?;
    written.push(report_path);

    if record.kind == RecordKind::Submit {
        match record.recovered_sample() {
            Some(sample) => {
                let sample_path = out_dir.join(&report.file_name);
                fs::write(&sample_path, sample)?;
                written.push(sample_path);
            }
            None => warn!(file = %report.file_name, "Sample not decrypted, not written"),
        }
    }

    info!(dir = %out_dir.display(), files = written.len(), "Wrote extraction outputs");
    Ok(written)
}
