//! Configuration management for HIPAAH
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the binary)
//! 2. Environment variables (`HIPAAH_*` prefix)
//! 3. hipaah.local.toml (gitignored, local overrides)
//! 4. hipaah.toml (git-tracked, project config)
//! 5. ~/.config/hipaah/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use anyhow::Result;
use hipaah_policy::{
    Clock, FixedClock, PolicyFormat, Rule, SystemClock, load_rules, load_rules_as,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::{ConfigLoader, LOCAL_CONFIG_FILE, PROJECT_CONFIG_FILE};

/// Main HIPAAH configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HipaahConfig {
    pub policy: PolicyConfig,
    pub evaluation: EvaluationConfig,
    pub logging: LoggingConfig,
}

/// Where the rule set comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub path: Option<PathBuf>,
    /// Overrides extension-based format detection.
    pub format: Option<PolicyFormat>,
}

impl PolicyConfig {
    /// Picks the policy file: an explicit path wins over `policy.path`.
    pub fn resolve_file(
        &self,
        explicit: Option<&Path>,
    ) -> std::result::Result<PathBuf, ConfigError> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.path.clone())
            .ok_or(ConfigError::NoPolicyFile)
    }

    /// Loads rules from `path`, using `policy.format` when set and the file
    /// extension otherwise.
    pub fn load_rules(&self, path: &Path) -> hipaah_policy::Result<Vec<Rule>> {
        match self.format {
            Some(format) => load_rules_as(path, format),
            None => load_rules(path),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub clock: ClockMode,
    /// Instant used when `clock = "fixed"`, e.g. `2024-01-01T10:00:00`.
    pub fixed_time: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClockMode {
    #[default]
    System,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Keys masked in log payloads and CLI output.
    pub redact_fields: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            redact_fields: Vec::new(),
        }
    }
}

impl HipaahConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from a specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Resolve relative paths to absolute
    pub fn resolve_paths(&mut self, base_dir: impl AsRef<Path>) {
        let base = base_dir.as_ref();

        if let Some(path) = &self.policy.path {
            if path.is_relative() {
                self.policy.path = Some(base.join(path));
            }
        }
    }

    /// Checks cross-field constraints.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.evaluation.clock == ClockMode::Fixed && self.fixed_clock().is_none() {
            let reason = match self.evaluation.fixed_time.as_deref() {
                None => "evaluation.clock is \"fixed\" but evaluation.fixed_time is not set"
                    .to_string(),
                Some(text) => format!("evaluation.fixed_time '{text}' is not a valid timestamp"),
            };
            return Err(ConfigError::ValidationError(reason));
        }
        Ok(())
    }

    /// The configured fixed instant, if one parses.
    pub fn fixed_clock(&self) -> Option<FixedClock> {
        self.evaluation
            .fixed_time
            .as_deref()
            .and_then(FixedClock::parse)
    }

    /// Builds the evaluation clock selected by `evaluation.clock`.
    pub fn clock(&self) -> std::result::Result<Box<dyn Clock>, ConfigError> {
        match self.evaluation.clock {
            ClockMode::System => Ok(Box::new(SystemClock)),
            ClockMode::Fixed => self
                .fixed_clock()
                .map(|c| Box::new(c) as Box<dyn Clock>)
                .ok_or_else(|| {
                    ConfigError::ValidationError(
                        "evaluation.fixed_time is missing or invalid".to_string(),
                    )
                }),
        }
    }
}
