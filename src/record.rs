//! Decoded quarantine records.
//!
//! Both decoders produce a [`Record`]: detection metadata plus, for
//! submissions, the embedded sample. The sample starts out as ciphertext and
//! is replaced by the recovered file once a decrypt step runs.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::hashing::sha256_digest;

/// Classification of a decoded container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A submitted sample; the only kind that carries sample bytes.
    Submit,
    /// A detection statistic without a sample.
    Stat,
    /// A heuristic detection without a sample.
    Heuristic,
    /// No recognized `TYPE`; callers skip extraction.
    #[default]
    Unknown,
}

impl RecordKind {
    /// Maps an Avast/AVG `TYPE` value, or `None` when it is not recognized.
    pub fn classify(type_value: &str) -> Option<Self> {
        if type_value == "VirusDlgStat" {
            Some(RecordKind::Stat)
        } else if type_value.starts_with("Submit") {
            Some(RecordKind::Submit)
        } else if type_value == "HeurSuspicious" {
            Some(RecordKind::Heuristic)
        } else {
            None
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecordKind::Submit => "submit",
            RecordKind::Stat => "stat",
            RecordKind::Heuristic => "heuristic",
            RecordKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Product family that produced a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Vendor {
    AvastAvg,
    Avira,
}

/// A content hash as reported by the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashDigest {
    pub algorithm: String,
    pub hex_digest: String,
}

impl HashDigest {
    pub fn new(algorithm: impl Into<String>, raw: &[u8]) -> Self {
        Self {
            algorithm: algorithm.into(),
            hex_digest: hex::encode(raw),
        }
    }
}

impl fmt::Display for HashDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex_digest)
    }
}

/// Sample bytes carried by a submit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sample {
    Encrypted(Vec<u8>),
    Decrypted(Vec<u8>),
}

impl Sample {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Sample::Encrypted(b) | Sample::Decrypted(b) => b,
        }
    }

    pub fn is_decrypted(&self) -> bool {
        matches!(self, Sample::Decrypted(_))
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Sample::Encrypted(b) | Sample::Decrypted(b) => b,
        }
    }
}

#[derive(Serialize)]
struct SampleSummary {
    decrypted: bool,
    len: usize,
    sha256: String,
}

fn serialize_sample<S: Serializer>(sample: &Option<Sample>, s: S) -> Result<S::Ok, S::Error> {
    sample
        .as_ref()
        .map(|sample| SampleSummary {
            decrypted: sample.is_decrypted(),
            len: sample.bytes().len(),
            sha256: sha256_digest(sample.bytes()),
        })
        .serialize(s)
}

/// A decoded container of either format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub vendor: Vendor,
    pub kind: RecordKind,
    /// Detected object name (Avast `NAME`).
    pub name: Option<String>,
    /// Original location of the quarantined file.
    pub path: Option<String>,
    /// Detection signature.
    pub signature: Option<String>,
    /// Avast `VIRU` value, the signature of Stat/Heuristic records.
    pub raw_signature: Option<String>,
    /// Operating system line of the Avast `SCOO` report.
    pub os: Option<String>,
    pub hash: Option<HashDigest>,
    pub meta_path: Option<String>,
    pub meta_hash: Option<HashDigest>,
    /// Free-form info string of Avira Qua files.
    pub info: Option<String>,
    /// Present only for [`RecordKind::Submit`].
    #[serde(serialize_with = "serialize_sample")]
    pub sample: Option<Sample>,
}

impl Record {
    pub fn new(vendor: Vendor) -> Self {
        Self {
            vendor,
            kind: RecordKind::Unknown,
            name: None,
            path: None,
            signature: None,
            raw_signature: None,
            os: None,
            hash: None,
            meta_path: None,
            meta_hash: None,
            info: None,
            sample: None,
        }
    }

    /// True when the caller has something to extract.
    pub fn is_extractable(&self) -> bool {
        self.kind != RecordKind::Unknown
    }

    /// Replaces an encrypted sample with `decrypt(ciphertext)`.
    ///
    /// Already-decrypted samples are left alone so the step is idempotent.
    pub fn decrypt_sample_with<F>(&mut self, decrypt: F)
    where
        F: FnOnce(&[u8]) -> Vec<u8>,
    {
        if let Some(Sample::Encrypted(ciphertext)) = &self.sample {
            let plain = decrypt(ciphertext);
            self.sample = Some(Sample::Decrypted(plain));
        }
    }

    /// Recovered sample bytes, if the sample has been decrypted.
    pub fn recovered_sample(&self) -> Option<&[u8]> {
        match &self.sample {
            Some(Sample::Decrypted(b)) => Some(b),
            _ => None,
        }
    }

    pub fn to_json_string(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
