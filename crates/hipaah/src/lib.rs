//! # hipaah: Field-level access control for health records
//!
//! The entry point for applications. Re-exports the policy engine
//! ([`hipaah_policy`]) and redaction toolkit ([`hipaah_redact`]) and adds a
//! [`Client`] that owns a rule set.
//!
//! ```
//! use hipaah::{Attributes, Client, Rule};
//! use serde_json::json;
//!
//! let client = Client::new().with_rules(vec![
//!     Rule::builder("receptionist", "treatment")
//!         .allow(["name", "appointment_time"])
//!         .mask(["diagnosis"])
//!         .build()?,
//! ]);
//!
//! let resource = json!({"name": "X", "diagnosis": "Asthma", "ssn": "123-45-6789"});
//! let view = client.evaluate(
//!     resource.as_object().cloned().unwrap_or_default(),
//!     "receptionist",
//!     "treatment",
//!     &Attributes::new(),
//! )?;
//!
//! assert_eq!(serde_json::Value::Object(view), json!({"name": "X", "diagnosis": "***"}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod client;
mod error;

pub use client::Client;
pub use error::{ClientError, Result};

pub use hipaah_policy::{
    AccessRequest, Allow, Attributes, Clock, Disposition, Engine, Evaluation, FixedClock,
    PolicyError, PolicyFormat, REDACTION_MARKER, Record, Rule, RuleBuilder, SystemClock, decide,
    evaluate, load_rules, load_rules_as, parse_rules,
};
pub use hipaah_redact::{
    DEFAULT_PATTERNS, LogRedaction, MaskStyle, PhiScrubber, RedactError, SafeLogger, mask_keys,
    mask_keys_except, redact_for_logging, safe_log_filter, scrub_text,
};
