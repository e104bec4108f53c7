//! # hipaah-redact: PHI redaction utilities
//!
//! Helpers for keeping protected health information out of places the
//! policy engine does not govern: logs, error payloads and free text.
//!
//! - [`mask_keys`] / [`mask_keys_except`]: recursive key-based masking
//! - [`safe_log_filter`]: masks caller keys plus [`SENSITIVE_KEYS`]
//! - [`redact_for_logging`]: masking with depth, width and length limits
//! - [`PhiScrubber`]: regex scrubbing of SSNs, phones, emails, dates, MRNs
//! - [`SafeLogger`]: tracing events with masked payloads
//!
//! ## Example
//!
//! ```
//! use hipaah_redact::{MaskStyle, mask_keys, scrub_text};
//! use serde_json::json;
//!
//! let record = json!({"patient": {"ssn": "123-45-6789"}});
//! let masked = mask_keys(&record, &["ssn"], MaskStyle::Marker);
//! assert_eq!(masked["patient"]["ssn"], json!("***"));
//!
//! assert_eq!(scrub_text("reach me at jane@example.org"), "reach me at ***");
//! ```

pub mod error;
pub mod logger;
pub mod masking;
pub mod scrub;

pub use error::{RedactError, Result};
pub use logger::SafeLogger;
pub use masking::{
    LogRedaction, MaskStyle, SENSITIVE_KEYS, mask_keys, mask_keys_except, redact_for_logging,
    safe_log_filter,
};
pub use scrub::{DEFAULT_PATTERNS, PhiScrubber, scrub_text};
