//! # hipaah-policy: Field-Level Attribute-Based Access Control
//!
//! Produces a field-level view of a structured record from a role, an
//! intent, contextual attributes and an ordered list of rules. Each field is
//! independently allowed, masked or denied.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  AccessRequest                               │
//! │  (Role + Intent + Attributes + Resource)     │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Engine                                      │
//! │  ├─ Walk rules in list order                 │
//! │  ├─ Match role, intent and conditions        │
//! │  ├─ Project fields: deny > mask > allow      │
//! │  └─ Stamp expiry for justified access        │
//! └─────────────────┬───────────────────────────┘
//!                   │
//!                   ▼
//! ┌─────────────────────────────────────────────┐
//! │  Filtered record                             │
//! │  - Fields in resource order                  │
//! │  - Masked values replaced by "***"           │
//! │  - Optional trailing _meta.expires_at        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! No matching rule means no access: the result is an empty record.
//!
//! ## Examples
//!
//! ```
//! use hipaah_policy::{AccessRequest, Engine, Rule, REDACTION_MARKER};
//! use serde_json::json;
//!
//! let rules = vec![
//!     Rule::builder("nurse", "treatment")
//!         .allow(["name"])
//!         .mask(["diagnosis"])
//!         .deny(["insurance_number"])
//!         .build()?,
//! ];
//!
//! let resource = json!({"name": "X", "diagnosis": "Asthma", "insurance_number": "123"});
//! let request = AccessRequest::new("nurse", "treatment")
//!     .with_resource(resource.as_object().cloned().unwrap_or_default());
//!
//! let view = Engine::new().evaluate(&request, &rules);
//! assert_eq!(view["name"], json!("X"));
//! assert_eq!(view["diagnosis"], json!(REDACTION_MARKER));
//! assert!(!view.contains_key("insurance_number"));
//! # Ok::<(), hipaah_policy::PolicyError>(())
//! ```
//!
//! ## Concurrency
//!
//! Rules expose no mutators and [`Engine`] holds only its clock, so a single
//! `&[Rule]` can be evaluated from any number of threads without locking.

pub mod attributes;
pub mod clock;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod rule;


/// Replacement value for masked fields. Downstream consumers depend on this exact value.
pub const REDACTION_MARKER: &str = "***";

pub use attributes::{AccessRequest, Attributes, JUSTIFICATION_ATTRIBUTE, Record};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{PolicyError, Result};
pub use evaluator::{Engine, Evaluation, META_KEY, decide, evaluate};
pub use loader::{PolicyFormat, load_rules, load_rules_as, parse_rules};
pub use rule::{Allow, Disposition, Rule, RuleBuilder};
