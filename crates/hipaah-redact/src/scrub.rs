//! Free-text PHI scrubbing.
//!
//! Replaces identifiers that look like PHI (SSNs, phone numbers, emails,
//! dates, card numbers, medical record numbers) inside unstructured text.
//! Patterns are applied in order, so earlier patterns win on overlap.

use crate::error::{RedactError, Result};
use hipaah_policy::REDACTION_MARKER;
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// Built-in PHI patterns, in application order.
pub const DEFAULT_PATTERNS: &[&str] = &[
    // SSN
    r"\b\d{3}[-\s]?\d{2}[-\s]?\d{4}\b",
    // Phone numbers
    r"\b\(\d{3}\)\s*\d{3}[-\s]?\d{4}\b",
    r"\(\d{3}\)\s+\d{3}-\d{4}",
    r"\b\d{3}[-\s]?\d{3}[-\s]?\d{4}\b",
    // Email
    r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
    // Dates
    r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b",
    r"\b\d{4}[/-]\d{1,2}[/-]\d{1,2}\b",
    // Credit cards
    r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b",
    // Medical record numbers
    r"\bMRN:?\s*\d{5,10}\b",
    r"\b[A-Z]{2,4}-\d{5,10}\b",
];

static DEFAULT_SCRUBBER: LazyLock<PhiScrubber> = LazyLock::new(|| {
    PhiScrubber::with_patterns(DEFAULT_PATTERNS.iter().copied())
        .expect("built-in PHI patterns are valid")
});

/// Replaces PHI-shaped substrings of free text with a marker.
#[derive(Debug, Clone)]
pub struct PhiScrubber {
    patterns: Vec<Regex>,
    marker: String,
}

impl PhiScrubber {
    /// Compiles a scrubber from custom patterns.
    ///
    /// # Errors
    ///
    /// Returns [`RedactError::InvalidPattern`] for the first pattern that
    /// does not compile.
    pub fn with_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref();
                Regex::new(pattern).map_err(|source| RedactError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            patterns,
            marker: REDACTION_MARKER.to_string(),
        })
    }

    /// Uses `marker` instead of the default redaction marker.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Scrubs `text`, applying each pattern in turn.
    pub fn scrub(&self, text: &str) -> String {
        self.patterns
            .iter()
            .fold(text.to_string(), |acc, pattern| {
                pattern
                    .replace_all(&acc, NoExpand(&self.marker))
                    .into_owned()
            })
    }
}

impl Default for PhiScrubber {
    fn default() -> Self {
        DEFAULT_SCRUBBER.clone()
    }
}

/// Scrubs `text` with the built-in patterns.
pub fn scrub_text(text: &str) -> String {
    DEFAULT_SCRUBBER.scrub(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scrub_ssn() {
        assert_eq!(scrub_text("SSN 123-45-6789 on file"), "SSN *** on file");
    }

    #[test]
    fn test_scrub_phone_numbers() {
        assert_eq!(scrub_text("Call (800) 555-1234 now"), "Call *** now");
        assert_eq!(scrub_text("Call 555-123-4567 now"), "Call *** now");
    }

    #[test]
    fn test_scrub_email() {
        assert_eq!(
            scrub_text("Contact john.doe@example.com today"),
            "Contact *** today"
        );
    }

    #[test]
    fn test_scrub_dates() {
        assert_eq!(scrub_text("Born 1980-04-12"), "Born ***");
        assert_eq!(scrub_text("Seen 4/12/2024"), "Seen ***");
    }

    #[test]
    fn test_scrub_medical_record_numbers() {
        assert_eq!(scrub_text("Patient MRN: 1234567 seen"), "Patient *** seen");
        assert_eq!(scrub_text("Ref HOSP-0012345"), "Ref ***");
    }

    #[test]
    fn test_clean_text_is_unchanged() {
        let text = "Patient reports mild headache after lunch.";
        assert_eq!(scrub_text(text), text);
    }

    #[test]
    fn test_custom_patterns_and_marker() {
        let scrubber = PhiScrubber::with_patterns([r"room \d+"])
            .unwrap()
            .with_marker("[REDACTED]");
        assert_eq!(scrubber.pattern_count(), 1);
        assert_eq!(scrubber.scrub("moved to room 12"), "moved to [REDACTED]");
    }

    #[test]
    fn test_marker_is_literal() {
        let scrubber = PhiScrubber::with_patterns([r"\d+"]).unwrap().with_marker("$0");
        assert_eq!(scrubber.scrub("bed 7"), "bed $0");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = PhiScrubber::with_patterns(["(unclosed"]).unwrap_err();
        match err {
            RedactError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
        }
    }

    #[test]
    fn test_default_uses_builtin_patterns() {
        assert_eq!(PhiScrubber::default().pattern_count(), DEFAULT_PATTERNS.len());
    }
}
