//! Quarantine container formats.

pub mod avast;
pub mod avira;
pub mod utils;
