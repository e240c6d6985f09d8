//! Tracing/logging setup shared by binaries and tests.

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use self::tracing::{LogFormat, init, init_with};
