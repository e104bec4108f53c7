//! Error types for rule construction and policy loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building rules or loading policy documents.
///
/// Evaluation itself never fails: an unmatched request is the designed
/// default-deny outcome, not an error.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// A rule is missing a required field or has a malformed one.
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// A rule inside a policy document failed validation.
    #[error("Invalid rule at position {index}: {reason}")]
    InvalidRuleAt { index: usize, reason: String },

    /// The policy file could not be read.
    #[error("Failed to read policy file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The policy file extension does not map to a known format.
    #[error("Unsupported policy format for {path}: expected .yaml, .yml or .json")]
    UnsupportedFormat { path: PathBuf },

    /// An unknown format name was requested.
    #[error("Unknown policy format '{0}': expected yaml or json")]
    UnknownFormat(String),

    /// The YAML document could not be parsed into rules.
    #[error("Failed to parse YAML policy: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document could not be parsed into rules.
    #[error("Failed to parse JSON policy: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for policy operations.
pub type Result<T> = std::result::Result<T, PolicyError>;
