//! Decoders for antivirus quarantine containers.
//!
//! Recovers quarantined samples and their detection metadata from AVG/Avast
//! submission containers and Avira `AntiVir Qua` files.
//!
//! ```no_run
//! use unquarantine::{report, ExtractConfig, Extractor};
//!
//! # fn main() -> unquarantine::Result<()> {
//! let extractor = Extractor::new(ExtractConfig::from_env());
//! let record = extractor.extract_path("upload.bin")?;
//! if record.is_extractable() {
//!     report::write_outputs(&record, "out", None)?;
//! }
//! # Ok(())
//! # }
//! ```

/// Path-based and sniffing extraction entry points
pub mod api;
/// XOR stream cipher and the shared keystream
pub mod cipher;
pub mod config;
pub mod error;
/// Container decoders
pub mod formats;
pub mod hashing;
/// Bounded file reading
pub mod io;
pub mod logging;
pub mod record;
pub mod report;
pub mod sniff;

pub use api::Extractor;
pub use cipher::Keystream;
pub use config::ExtractConfig;
pub use error::{ErrorKind, QuarantineError, Result};
pub use record::{HashDigest, Record, RecordKind, Sample, Vendor};
pub use sniff::ContainerFormat;
