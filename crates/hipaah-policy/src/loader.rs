//! Policy document loading.
//!
//! A policy document is a list of rule entries, each a mapping with the keys
//! `role`, `intent`, `allow`, `mask`, `deny`, `conditions` and
//! `justification_ttl`. Document order is rule precedence.

use crate::error::{PolicyError, Result};
use crate::rule::{RawRule, Rule};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Serialization format of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyFormat {
    Yaml,
    Json,
}

impl PolicyFormat {
    /// Infers the format from a file extension (`.yaml`, `.yml`, `.json`).
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(PolicyError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl FromStr for PolicyFormat {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(PolicyError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for PolicyFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Parses rules from an in-memory policy document.
///
/// An empty document yields no rules. The first invalid entry aborts the
/// load with [`PolicyError::InvalidRuleAt`].
pub fn parse_rules(text: &str, format: PolicyFormat) -> Result<Vec<Rule>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let entries: Option<Vec<RawRule>> = match format {
        PolicyFormat::Yaml => serde_yaml::from_str(text)?,
        PolicyFormat::Json => serde_json::from_str(text)?,
    };

    entries
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            Rule::try_from(raw).map_err(|err| match err {
                PolicyError::InvalidRule(reason) => PolicyError::InvalidRuleAt { index, reason },
                other => other,
            })
        })
        .collect()
}

/// Loads rules from a file, inferring the format from its extension.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Vec<Rule>> {
    let path = path.as_ref();
    load_rules_as(path, PolicyFormat::from_path(path)?)
}

/// Loads rules from a file in an explicit format.
pub fn load_rules_as(path: impl AsRef<Path>, format: PolicyFormat) -> Result<Vec<Rule>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let rules = parse_rules(&text, format)?;
    info!(
        path = %path.display(),
        format = %format,
        rules = rules.len(),
        "Loaded policy"
    );
    Ok(rules)
}
