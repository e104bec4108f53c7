//! Policy validation.

use crate::style::{colors::SemanticStyle, print_success};
use anyhow::{Context, Result};
use hipaah::{Allow, Rule};
use hipaah_config::HipaahConfig;
use std::path::Path;

/// Loads a policy file and lists its rules in precedence order.
///
/// Without an explicit file, `policy.path` from configuration is used.
pub fn run(policy_file: Option<&Path>, config: &HipaahConfig) -> Result<()> {
    let policy_file = config.policy.resolve_file(policy_file)?;
    let rules = config
        .policy
        .load_rules(&policy_file)
        .with_context(|| format!("Invalid policy file {}", policy_file.display()))?;

    print_success(&format!(
        "{} rule(s) loaded from {}",
        rules.len(),
        policy_file.display().code()
    ));

    for (index, rule) in rules.iter().enumerate() {
        println!("  {} {}", format!("[{index}]").muted(), describe(rule));
    }
    Ok(())
}

fn describe(rule: &Rule) -> String {
    let allow = match rule.allow() {
        Allow::Wildcard => "*".to_string(),
        Allow::Explicit(fields) => fields.len().to_string(),
    };
    let ttl = rule
        .justification_ttl()
        .map_or_else(|| "-".to_string(), |minutes| format!("{minutes}m"));

    format!(
        "{}/{}  allow: {allow}  mask: {}  deny: {}  conditions: {}  ttl: {ttl}",
        rule.role(),
        rule.intent(),
        rule.mask().len(),
        rule.deny().len(),
        rule.conditions().len(),
    )
}
