//! Structured logging with masked fields.

use crate::masking::{MaskStyle, mask_keys};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use tracing::{info, warn};

/// Emits tracing events whose payload has the configured keys masked.
///
/// Masking applies at every depth of the payload, so a nested `ssn` is
/// hidden just like a top-level one.
#[derive(Debug, Clone, Default)]
pub struct SafeLogger {
    masked: BTreeSet<String>,
}

impl SafeLogger {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            masked: fields.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds a key to the masked set.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.masked.insert(field.into());
        self
    }

    pub fn masked_fields(&self) -> &BTreeSet<String> {
        &self.masked
    }

    /// Returns `data` with every masked key replaced.
    pub fn redact(&self, data: &Map<String, Value>) -> Map<String, Value> {
        let keys: Vec<&str> = self.masked.iter().map(String::as_str).collect();
        match mask_keys(&Value::Object(data.clone()), &keys, MaskStyle::Marker) {
            Value::Object(redacted) => redacted,
            _ => unreachable!("masking an object always yields an object"),
        }
    }

    pub fn info(&self, message: &str, data: &Map<String, Value>) {
        let payload = Value::Object(self.redact(data));
        info!(payload = %payload, "{message}");
    }

    pub fn warn(&self, message: &str, data: &Map<String, Value>) {
        let payload = Value::Object(self.redact(data));
        warn!(payload = %payload, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hipaah_policy::REDACTION_MARKER;
    use serde_json::json;

    #[test]
    fn test_redact_masks_configured_fields() {
        let logger = SafeLogger::new(["diagnosis", "ssn"]);
        let data = json!({
            "role": "nurse",
            "diagnosis": "Asthma",
            "patient": {"ssn": "123-45-6789", "ward": "B"}
        });

        let redacted = logger.redact(data.as_object().unwrap());

        assert_eq!(redacted["role"], json!("nurse"));
        assert_eq!(redacted["diagnosis"], json!(REDACTION_MARKER));
        assert_eq!(redacted["patient"]["ssn"], json!(REDACTION_MARKER));
        assert_eq!(redacted["patient"]["ward"], json!("B"));
    }

    #[test]
    fn test_empty_logger_passes_through() {
        let logger = SafeLogger::default();
        let data = json!({"diagnosis": "Asthma"});
        assert_eq!(
            Value::Object(logger.redact(data.as_object().unwrap())),
            data
        );
    }

    #[test]
    fn test_with_field_extends_set() {
        let logger = SafeLogger::new(["ssn"]).with_field("mrn").with_field("ssn");
        let fields: Vec<&str> = logger.masked_fields().iter().map(String::as_str).collect();
        assert_eq!(fields, vec!["mrn", "ssn"]);
    }

    #[test]
    fn test_logging_does_not_panic_without_subscriber() {
        let logger = SafeLogger::new(["ssn"]);
        let data = json!({"ssn": "123"});
        logger.info("Access evaluated", data.as_object().unwrap());
        logger.warn("Access denied", data.as_object().unwrap());
    }
}
