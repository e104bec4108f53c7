//! Rule definitions.
//!
//! A rule binds a `(role, intent)` pair to a set of field dispositions and
//! optional equality conditions on request attributes. Rules are immutable
//! value objects: once built they expose accessors only, so a rule list can be
//! shared read-only across any number of concurrent evaluations.

use crate::error::{PolicyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Source token that turns `allow` into a wildcard.
pub const WILDCARD: &str = "*";

// ============================================================================
// Allow
// ============================================================================

/// The set of fields a rule explicitly permits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allow {
    /// Every field that is not denied or masked.
    Wildcard,
    /// Only the listed fields.
    Explicit(BTreeSet<String>),
}

impl Allow {
    /// Returns `true` if the field is permitted by this allow list.
    pub fn permits(&self, field: &str) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Explicit(fields) => fields.contains(field),
        }
    }

    /// Returns `true` for the wildcard variant.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

impl Default for Allow {
    /// Defaults to an empty explicit list (nothing permitted).
    fn default() -> Self {
        Self::Explicit(BTreeSet::new())
    }
}

// ============================================================================
// Disposition
// ============================================================================

/// What a rule does with a single resource field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Field is removed from the output.
    Deny,
    /// Field value is replaced by the redaction marker.
    Mask,
    /// Field value is copied unchanged.
    Allow,
    /// Field is not mentioned by the rule and is dropped.
    Omit,
}

impl Disposition {
    /// Returns `true` if the field appears in the output at all.
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Mask | Self::Allow)
    }
}

// ============================================================================
// Rule
// ============================================================================

/// A single field-level access rule.
///
/// Field priority is `deny > mask > allow`: a field listed in several sets
/// takes the most restrictive disposition. Fields listed nowhere are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRule", into = "RawRule")]
pub struct Rule {
    role: String,
    intent: String,
    allow: Allow,
    mask: BTreeSet<String>,
    deny: BTreeSet<String>,
    conditions: Map<String, Value>,
    justification_ttl: Option<u32>,
}

impl Rule {
    /// Starts building a rule for the given role and intent.
    pub fn builder(role: impl Into<String>, intent: impl Into<String>) -> RuleBuilder {
        RuleBuilder::new(role, intent)
    }

    /// Role this rule applies to.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Intent this rule applies to.
    pub fn intent(&self) -> &str {
        &self.intent
    }

    /// Explicitly permitted fields.
    pub fn allow(&self) -> &Allow {
        &self.allow
    }

    /// Fields replaced by the redaction marker.
    pub fn mask(&self) -> &BTreeSet<String> {
        &self.mask
    }

    /// Fields removed from the output.
    pub fn deny(&self) -> &BTreeSet<String> {
        &self.deny
    }

    /// Attribute equality constraints. Empty means always satisfied.
    pub fn conditions(&self) -> &Map<String, Value> {
        &self.conditions
    }

    /// Minutes of provisional access granted when a justification is given.
    pub fn justification_ttl(&self) -> Option<u32> {
        self.justification_ttl
    }

    /// Resolves the disposition of a field through the `deny > mask > allow` chain.
    pub fn disposition(&self, field: &str) -> Disposition {
        if self.deny.contains(field) {
            Disposition::Deny
        } else if self.mask.contains(field) {
            Disposition::Mask
        } else if self.allow.permits(field) {
            Disposition::Allow
        } else {
            Disposition::Omit
        }
    }

    /// Returns `true` if this rule is keyed on the given role and intent.
    pub fn applies_to(&self, role: &str, intent: &str) -> bool {
        self.role == role && self.intent == intent
    }
}

// ============================================================================
// RuleBuilder
// ============================================================================

/// Builder for [`Rule`]. Validation happens in [`RuleBuilder::build`].
#[derive(Debug, Clone)]
pub struct RuleBuilder {
    role: String,
    intent: String,
    allow: Allow,
    mask: BTreeSet<String>,
    deny: BTreeSet<String>,
    conditions: Map<String, Value>,
    justification_ttl: Option<u32>,
}

impl RuleBuilder {
    fn new(role: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            intent: intent.into(),
            allow: Allow::default(),
            mask: BTreeSet::new(),
            deny: BTreeSet::new(),
            conditions: Map::new(),
            justification_ttl: None,
        }
    }

    /// Permits every field that is not denied or masked.
    pub fn allow_all(mut self) -> Self {
        self.allow = Allow::Wildcard;
        self
    }

    /// Adds fields to the explicit allow list. No effect once `allow_all` was called.
    pub fn allow<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Allow::Explicit(set) = &mut self.allow {
            set.extend(fields.into_iter().map(Into::into));
        }
        self
    }

    /// Adds fields to the mask set.
    pub fn mask<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mask.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Adds fields to the deny set.
    pub fn deny<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deny.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Requires `attributes[key] == value` for the rule to match.
    pub fn condition(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(key.into(), value.into());
        self
    }

    /// Grants provisional access for `minutes` when a justification is supplied.
    pub fn justification_ttl(mut self, minutes: u32) -> Self {
        self.justification_ttl = Some(minutes);
        self
    }

    /// Validates and builds the rule.
    pub fn build(self) -> Result<Rule> {
        require_non_empty("role", &self.role)?;
        require_non_empty("intent", &self.intent)?;

        Ok(Rule {
            role: self.role,
            intent: self.intent,
            allow: self.allow,
            mask: self.mask,
            deny: self.deny,
            conditions: self.conditions,
            justification_ttl: self.justification_ttl,
        })
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PolicyError::InvalidRule(format!(
            "'{field}' is required and must not be empty"
        )));
    }
    Ok(())
}

// ============================================================================
// Source representation
// ============================================================================

/// `allow` as written in a policy document: `"*"` or a list of field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawAllow {
    Token(String),
    Fields(Vec<String>),
}

/// A rule entry exactly as it appears in a policy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawRule {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow: Option<RawAllow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justification_ttl: Option<u32>,
}

impl TryFrom<RawAllow> for Allow {
    type Error = PolicyError;

    fn try_from(raw: RawAllow) -> Result<Self> {
        match raw {
            RawAllow::Token(token) if token == WILDCARD => Ok(Self::Wildcard),
            RawAllow::Token(token) => Err(PolicyError::InvalidRule(format!(
                "'allow' must be \"{WILDCARD}\" or a list of field names, found string '{token}'"
            ))),
            RawAllow::Fields(fields) if fields.len() == 1 && fields[0] == WILDCARD => {
                Ok(Self::Wildcard)
            }
            RawAllow::Fields(fields) if fields.iter().any(|f| f == WILDCARD) => {
                Err(PolicyError::InvalidRule(format!(
                    "'allow' mixes \"{WILDCARD}\" with explicit field names"
                )))
            }
            RawAllow::Fields(fields) => Ok(Self::Explicit(fields.into_iter().collect())),
        }
    }
}

impl TryFrom<RawRule> for Rule {
    type Error = PolicyError;

    fn try_from(raw: RawRule) -> Result<Self> {
        let mut builder = RuleBuilder::new(
            raw.role.unwrap_or_default(),
            raw.intent.unwrap_or_default(),
        );

        if let Some(allow) = raw.allow {
            builder.allow = Allow::try_from(allow)?;
        }
        builder.mask = raw.mask.unwrap_or_default().into_iter().collect();
        builder.deny = raw.deny.unwrap_or_default().into_iter().collect();
        builder.conditions = raw.conditions.unwrap_or_default();
        builder.justification_ttl = raw.justification_ttl;

        builder.build()
    }
}

impl From<Rule> for RawRule {
    fn from(rule: Rule) -> Self {
        let allow = match rule.allow {
            Allow::Wildcard => RawAllow::Token(WILDCARD.to_string()),
            Allow::Explicit(fields) => RawAllow::Fields(fields.into_iter().collect()),
        };

        Self {
            role: Some(rule.role),
            intent: Some(rule.intent),
            allow: Some(allow),
            mask: Some(rule.mask.into_iter().collect()),
            deny: Some(rule.deny.into_iter().collect()),
            conditions: (!rule.conditions.is_empty()).then_some(rule.conditions),
            justification_ttl: rule.justification_ttl,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
