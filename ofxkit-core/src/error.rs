//! Error type for the date path. Amount normalization never fails.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("unrecognized OFX date '{0}' (expected YYYYMMDD or YYYYMMDDHHMMSS)")]
    UnrecognizedDate(String),

    #[error("date components out of range in '{0}'")]
    InvalidComponents(String),

    #[error("invalid timezone offset '{0}' (integer hours only)")]
    InvalidOffset(String),

    #[error("local time {0} does not exist in zone {1}")]
    NonexistentLocalTime(String, String),

    #[error("unknown timezone: {0}")]
    UnknownZone(String),

    /// Raised by an instant factory that could not build its value.
    #[error("instant factory failed for '{input}': {reason}")]
    Factory { input: String, reason: String },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
