//! Redaction errors.

use thiserror::Error;

/// Errors raised while building redaction helpers.
#[derive(Debug, Error)]
pub enum RedactError {
    /// A scrubbing pattern failed to compile.
    #[error("invalid scrub pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for redaction operations.
pub type Result<T> = std::result::Result<T, RedactError>;
