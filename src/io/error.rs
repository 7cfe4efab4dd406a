//! Errors raised by the bounded container reader.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IoError {
    #[error("Container of {found} bytes exceeds the {limit} byte limit")]
    FileTooLarge { limit: u64, found: u64 },

    #[error("Reading {requested} more bytes would exceed the {limit} byte read budget (already read: {current})")]
    ReadLimitExceeded {
        limit: u64,
        current: u64,
        requested: u64,
    },

    #[error("Failed to open container: {0}")]
    StdIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
