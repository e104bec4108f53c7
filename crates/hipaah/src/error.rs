//! Client errors.

use hipaah_policy::PolicyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// `evaluate` was called before any rule set was loaded.
    #[error("no policies loaded; call load_policy first")]
    NoPoliciesLoaded,

    #[error(transparent)]
    Policy(#[from] PolicyError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
