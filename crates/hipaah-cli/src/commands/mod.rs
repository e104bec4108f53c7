//! CLI command implementations.

pub mod config;
pub mod scrub;
pub mod test_policy;
pub mod validate;
pub mod version;
