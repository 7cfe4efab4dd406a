//! Error types for quarantine container decoding.
//!
//! Decoding distinguishes three outcomes: inputs that must be rejected
//! (bad magic, truncated or malformed fields), inputs that parse but use an
//! undocumented variant (e.g. an odd `SIZE` width), and environment failures
//! (I/O, missing keystream). Partial meta blocks and unclassified records are
//! not errors and never reach this type.

use thiserror::Error;

use crate::io::error::IoError;

/// Main error type for container decoding.
#[derive(Debug, Error)]
pub enum QuarantineError {
    /// Magic bytes did not match the expected container format
    #[error("Invalid {format} container: {reason}")]
    InvalidFormat {
        format: &'static str,
        reason: String,
    },

    /// A `SIZE` field with a width other than 4 or 8 bytes
    #[error("Unsupported {tag} field of length {size}")]
    UnsupportedField { tag: String, size: u32 },

    /// A field or fixed offset runs past the end of the buffer
    #[error("Truncated input at offset {offset:#x}: need {needed} bytes, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Payload is not valid text in the expected encoding
    #[error("Invalid {encoding} string at offset {offset:#x}")]
    InvalidString {
        offset: usize,
        encoding: &'static str,
    },

    /// Field payload decoded but its content is not usable
    #[error("Malformed {tag} field: {reason}")]
    MalformedField { tag: String, reason: String },

    /// Multipart or zip envelope could not be unwrapped
    #[error("Envelope error: {0}")]
    Envelope(String),

    /// Keystream resource missing or unusable
    #[error("Keystream error: {0}")]
    Keystream(String),

    /// Bounded reader errors
    #[error(transparent)]
    BoundedIo(#[from] IoError),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors (config, record summaries)
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of a [`QuarantineError`] for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a valid container; drop it.
    Reject,
    /// The input uses a variant this decoder does not understand.
    Unsupported,
    /// The environment failed; the same input may succeed elsewhere.
    Environment,
}

impl QuarantineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuarantineError::InvalidFormat { .. }
            | QuarantineError::Truncated { .. }
            | QuarantineError::InvalidString { .. }
            | QuarantineError::MalformedField { .. }
            | QuarantineError::Envelope(_) => ErrorKind::Reject,
            QuarantineError::UnsupportedField { .. } => ErrorKind::Unsupported,
            QuarantineError::Keystream(_)
            | QuarantineError::BoundedIo(_)
            | QuarantineError::Io(_)
            | QuarantineError::Serialization(_) => ErrorKind::Environment,
        }
    }

    pub(crate) fn truncated(offset: usize, needed: usize, available: usize) -> Self {
        QuarantineError::Truncated {
            offset,
            needed,
            available,
        }
    }
}

/// Result type alias for decoding operations
pub type Result<T> = std::result::Result<T, QuarantineError>;
