//! High-level extraction: sniff, decode, decrypt.

use std::path::Path;
use tracing::{info, info_span};

use crate::cipher::Keystream;
use crate::config::ExtractConfig;
use crate::error::{QuarantineError, Result};
use crate::formats::{avast, avira};
use crate::io::SafeReader;
use crate::record::Record;
use crate::sniff::{self, ContainerFormat};

/// Decodes containers of either vendor and recovers their samples.
///
/// Without an injected keystream the process-wide one is loaded from
/// `config.keystream_path` the first time an AVG/Avast submission needs it.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
    keystream: Option<Keystream>,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self {
            config,
            keystream: None,
        }
    }

    pub fn with_keystream(config: ExtractConfig, keystream: Keystream) -> Self {
        Self {
            config,
            keystream: Some(keystream),
        }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    fn keystream(&self) -> Result<&Keystream> {
        match &self.keystream {
            Some(keystream) => Ok(keystream),
            None => Keystream::shared(&self.config.keystream_path),
        }
    }

    /// Decodes `data` according to its detected format.
    ///
    /// Unknown AVG/Avast records are returned as-is; check
    /// [`Record::is_extractable`] before writing anything out.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Record> {
        let format = sniff::detect(data, &self.config.multipart_boundary);
        let span = info_span!("extract", %format, len = data.len());
        let _guard = span.enter();

        let record = match format {
            ContainerFormat::AvastAvg => {
                let mut record = avast::decode(data)?;
                if record.sample.is_some() {
                    avast::decrypt_record(
                        &mut record,
                        self.keystream()?,
                        self.config.cipher_chunk_size,
                    );
                }
                record
            }
            ContainerFormat::AviraQua => avira::extract(data)?,
            ContainerFormat::Zip => {
                let qua = avira::envelope::unzip_first_entry(
                    data,
                    self.config.max_archive_entry_size,
                )?;
                avira::extract(&qua)?
            }
            ContainerFormat::Multipart => avira::decode_submission(data, &self.config)?,
            ContainerFormat::Unknown => {
                return Err(QuarantineError::InvalidFormat {
                    format: "quarantine",
                    reason: "no known container magic".to_string(),
                })
            }
        };

        info!(
            vendor = ?record.vendor,
            kind = %record.kind,
            recovered = record.recovered_sample().map(<[u8]>::len),
            "Extracted container"
        );
        Ok(record)
    }

    /// Reads `path` within the configured I/O limits and extracts it.
    pub fn extract_path<P: AsRef<Path>>(&self, path: P) -> Result<Record> {
        let mut reader = SafeReader::open(path.as_ref(), self.config.io.clone())?;
        let data = reader.read_all()?;
        self.extract_bytes(&data)
    }
}
