//! Key-based masking of JSON-like data.
//!
//! Unlike rule evaluation, which projects a flat record, these helpers walk
//! nested maps and lists and mask every value whose key matches. They are
//! meant for log lines, error payloads and UI fixtures.
//!
//! ## Styles
//!
//! | Style        | bool    | number | anything else |
//! |--------------|---------|--------|---------------|
//! | Marker       | `***`   | `***`  | `***`         |
//! | PreserveType | `false` | `0`    | `***`         |

use hipaah_policy::REDACTION_MARKER;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Keys masked by [`safe_log_filter`] regardless of caller input.
pub const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "token",
    "key",
    "ssn",
    "social_security",
    "credit_card",
    "cc_number",
    "credential",
    "auth",
    "patient_id",
    "mrn",
    "medical_record_number",
];

// ---------------------------------------------------------------------------
// Masking style
// ---------------------------------------------------------------------------

/// How a masked value is replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskStyle {
    /// Replace with the redaction marker.
    #[default]
    Marker,
    /// Keep the JSON type where possible: `false` for bools, `0` for numbers.
    PreserveType,
}

impl MaskStyle {
    fn replacement(self, original: &Value) -> Value {
        match (self, original) {
            (Self::PreserveType, Value::Bool(_)) => Value::Bool(false),
            (Self::PreserveType, Value::Number(_)) => Value::from(0),
            _ => Value::String(REDACTION_MARKER.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Core masking functions
// ---------------------------------------------------------------------------

/// Recursively masks the values of `keys` in maps at any depth.
///
/// Returns a new value; the input is untouched. Primitives and an empty key
/// list return the input unchanged.
pub fn mask_keys<S: AsRef<str>>(value: &Value, keys: &[S], style: MaskStyle) -> Value {
    if keys.is_empty() {
        return value.clone();
    }

    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let masked = if is_listed(k, keys) {
                        style.replacement(v)
                    } else {
                        mask_keys(v, keys, style)
                    };
                    (k.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| mask_keys(item, keys, style))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Masks every top-level key of `map` that is not in `allowed`.
///
/// Keys chosen for masking are masked at every depth, as with [`mask_keys`].
pub fn mask_keys_except<S: AsRef<str>>(
    map: &Map<String, Value>,
    allowed: &[S],
) -> Map<String, Value> {
    let to_mask: Vec<&str> = map
        .keys()
        .map(String::as_str)
        .filter(|k| !is_listed(k, allowed))
        .collect();

    match mask_keys(&Value::Object(map.clone()), &to_mask, MaskStyle::Marker) {
        Value::Object(masked) => masked,
        _ => unreachable!("masking an object always yields an object"),
    }
}

/// Masks `extra_keys` plus [`SENSITIVE_KEYS`] so a payload is safe to log.
pub fn safe_log_filter<S: AsRef<str>>(
    data: &Map<String, Value>,
    extra_keys: &[S],
) -> Map<String, Value> {
    let mut keys: Vec<&str> = extra_keys.iter().map(AsRef::as_ref).collect();
    keys.extend_from_slice(SENSITIVE_KEYS);
    keys.sort_unstable();
    keys.dedup();

    match mask_keys(&Value::Object(data.clone()), &keys, MaskStyle::Marker) {
        Value::Object(masked) => masked,
        _ => unreachable!("masking an object always yields an object"),
    }
}

fn is_listed<S: AsRef<str>>(key: &str, keys: &[S]) -> bool {
    keys.iter().any(|k| k.as_ref() == key)
}

// ---------------------------------------------------------------------------
// Log redaction with truncation
// ---------------------------------------------------------------------------

/// Limits applied by [`redact_for_logging`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRedaction {
    /// Nesting depth at which values are replaced by a truncation note.
    pub max_depth: usize,
    /// Array elements kept before the rest are summarized.
    pub max_array_items: usize,
    /// Characters kept from long strings.
    pub max_string_chars: usize,
}

impl Default for LogRedaction {
    fn default() -> Self {
        Self {
            max_depth: 5,
            max_array_items: 3,
            max_string_chars: 100,
        }
    }
}

/// Masks `phi_keys` and truncates deep, wide or long data for compact logs.
pub fn redact_for_logging<S: AsRef<str>>(
    value: &Value,
    phi_keys: &[S],
    limits: LogRedaction,
) -> Value {
    redact_at_depth(value, phi_keys, limits, 0)
}

fn redact_at_depth<S: AsRef<str>>(
    value: &Value,
    phi_keys: &[S],
    limits: LogRedaction,
    depth: usize,
) -> Value {
    if depth >= limits.max_depth {
        return Value::String("... (truncated due to depth)".to_string());
    }

    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let redacted = if is_listed(k, phi_keys) {
                        Value::String(REDACTION_MARKER.to_string())
                    } else {
                        redact_at_depth(v, phi_keys, limits, depth + 1)
                    };
                    (k.clone(), redacted)
                })
                .collect(),
        ),
        Value::Array(items) => {
            let mut kept: Vec<Value> = items
                .iter()
                .take(limits.max_array_items)
                .map(|item| redact_at_depth(item, phi_keys, limits, depth + 1))
                .collect();
            if items.len() > limits.max_array_items {
                let remaining = items.len() - limits.max_array_items;
                kept.push(Value::String(format!("... ({remaining} more items)")));
            }
            Value::Array(kept)
        }
        Value::String(text) => {
            let total = text.chars().count();
            if total > limits.max_string_chars {
                let head: String = text.chars().take(limits.max_string_chars).collect();
                let remaining = total - limits.max_string_chars;
                Value::String(format!("{head}... ({remaining} more chars)"))
            } else {
                value.clone()
            }
        }
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
