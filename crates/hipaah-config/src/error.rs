//! Configuration error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("No policy file given and policy.path is not configured")]
    NoPolicyFile,

    #[error("XDG directory error: {0}")]
    XdgError(String),
}
