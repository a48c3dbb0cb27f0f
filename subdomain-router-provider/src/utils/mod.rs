//! Utility modules.

/// Log truncation so provider responses never flood the log.
pub mod log_sanitizer;
