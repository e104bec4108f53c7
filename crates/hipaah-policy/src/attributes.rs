//! Request types and attribute value semantics.
//!
//! Attributes and resource fields are JSON-like values
//! ([`serde_json::Value`]). Maps keep insertion order so that projected
//! records serialize deterministically.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Contextual attributes supplied with a request (shift, department, justification, ...).
pub type Attributes = Map<String, Value>;

/// A structured record whose fields are filtered by a rule.
pub type Record = Map<String, Value>;

/// Attribute key that carries a free-text reason for provisional access.
pub const JUSTIFICATION_ATTRIBUTE: &str = "justification";

// ============================================================================
// AccessRequest
// ============================================================================

/// One evaluation request: who is asking, why, in what context, for which record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Role of the caller (e.g. "nurse", "billing_admin").
    pub role: String,
    /// Purpose of access (e.g. "treatment", "billing").
    pub intent: String,
    /// Contextual attributes matched against rule conditions.
    #[serde(default)]
    pub attributes: Attributes,
    /// The record being filtered.
    #[serde(default)]
    pub resource: Record,
}

impl AccessRequest {
    /// Creates a request with no attributes and an empty resource.
    pub fn new(role: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            intent: intent.into(),
            attributes: Map::new(),
            resource: Map::new(),
        }
    }

    /// Sets a single attribute (builder pattern).
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Replaces all attributes.
    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets the record to filter.
    pub fn with_resource(mut self, resource: Record) -> Self {
        self.resource = resource;
        self
    }

    /// Returns `true` if the request carries a non-empty justification.
    pub fn has_justification(&self) -> bool {
        self.attributes
            .get(JUSTIFICATION_ATTRIBUTE)
            .is_some_and(is_present)
    }
}

// ============================================================================
// Value semantics
// ============================================================================

/// Strict equality between an attribute value and a condition value.
///
/// Values of different JSON types are never equal. Numbers compare by
/// numeric value, so `1` equals `1.0`. Lists and maps compare element-wise.
#[allow(clippy::float_cmp)]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
                x == y
            } else {
                match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                }
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, x)| b.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => false,
    }
}

/// Returns `true` if a value counts as supplied.
///
/// `null`, `false`, `0`, `""`, `[]` and `{}` count as absent.
#[allow(clippy::float_cmp)]
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// ============================================================================
// Tests
// ============================================================================
