//! Common test utilities and helpers.

pub mod builders;
