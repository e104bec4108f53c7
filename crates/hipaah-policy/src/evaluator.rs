//! Policy evaluation engine.
//!
//! Evaluates a request against an ordered rule list. The first rule whose
//! role, intent and conditions all match is applied to the resource; later
//! rules are never consulted. If no rule matches, the result is empty
//! (default-deny-all).

use crate::attributes::{AccessRequest, Record, values_equal};
use crate::clock::{Clock, SystemClock, format_timestamp};
use crate::rule::{Disposition, Rule};
use crate::REDACTION_MARKER;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Reserved result key carrying evaluation metadata.
pub const META_KEY: &str = "_meta";

/// Key inside [`META_KEY`] holding the provisional-access expiry.
pub const EXPIRES_AT_KEY: &str = "expires_at";

// ============================================================================
// Evaluation
// ============================================================================

/// The outcome of evaluating one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Index of the rule that matched, or `None` for default deny.
    pub matched_rule: Option<usize>,
    /// Projected fields, in resource order.
    pub fields: Record,
    /// Expiry of provisional access granted through a justification.
    pub expires_at: Option<NaiveDateTime>,
    /// Human-readable explanation of why this outcome was produced.
    pub reason: String,
}

impl Evaluation {
    fn default_deny() -> Self {
        Self {
            matched_rule: None,
            fields: Map::new(),
            expires_at: None,
            reason: "No rule matched; default deny".to_string(),
        }
    }

    /// Returns `true` if no rule matched.
    pub fn is_default_deny(&self) -> bool {
        self.matched_rule.is_none()
    }

    /// Renders the caller-facing view: projected fields plus a trailing
    /// `_meta` entry when provisional access was granted.
    pub fn into_view(self) -> Record {
        let mut view = self.fields;
        if let Some(expires_at) = self.expires_at {
            let mut meta = Map::new();
            meta.insert(
                EXPIRES_AT_KEY.to_string(),
                Value::String(format_timestamp(expires_at)),
            );
            view.insert(META_KEY.to_string(), Value::Object(meta));
        }
        view
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Stateless evaluation engine holding only its clock.
///
/// `Engine` is `Send + Sync`; one instance can serve any number of threads
/// against the same read-only rule list.
#[derive(Debug, Clone, Default)]
pub struct Engine<C = SystemClock> {
    clock: C,
}

impl Engine<SystemClock> {
    /// Creates an engine on the local wall clock.
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> Engine<C> {
    /// Creates an engine reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Evaluates a request and returns the filtered record.
    pub fn evaluate(&self, request: &AccessRequest, rules: &[Rule]) -> Record {
        self.decide(request, rules).into_view()
    }

    /// Evaluates a request and returns the full [`Evaluation`].
    pub fn decide(&self, request: &AccessRequest, rules: &[Rule]) -> Evaluation {
        decide(request, rules, &self.clock)
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Evaluates a request against `rules` and returns the filtered record.
///
/// # Postcondition
///
/// Always returns a record (possibly empty) -- never panics, never fails.
pub fn evaluate<C: Clock + ?Sized>(request: &AccessRequest, rules: &[Rule], clock: &C) -> Record {
    decide(request, rules, clock).into_view()
}

/// Evaluates a request against `rules` and returns the full [`Evaluation`].
pub fn decide<C: Clock + ?Sized>(request: &AccessRequest, rules: &[Rule], clock: &C) -> Evaluation {
    let Some((index, rule)) = rules
        .iter()
        .enumerate()
        .find(|(_, rule)| rule_matches(rule, request))
    else {
        debug!(
            role = %request.role,
            intent = %request.intent,
            rules = rules.len(),
            "No rule matched; applying default deny"
        );
        return Evaluation::default_deny();
    };

    let projection = project(rule, &request.resource);
    let expires_at = justification_expiry(rule, request, clock);

    debug!(
        role = %request.role,
        intent = %request.intent,
        rule = index,
        kept = projection.fields.len(),
        masked = projection.masked,
        omitted = projection.omitted,
        provisional = expires_at.is_some(),
        "Rule matched"
    );

    Evaluation {
        matched_rule: Some(index),
        fields: projection.fields,
        expires_at,
        reason: format!(
            "Matched rule #{index} ({}/{})",
            rule.role(),
            rule.intent()
        ),
    }
}

// ============================================================================
// Matching
// ============================================================================

/// A rule matches when role and intent are equal and every condition holds.
///
/// A condition key absent from the request attributes fails the match.
fn rule_matches(rule: &Rule, request: &AccessRequest) -> bool {
    rule.applies_to(&request.role, &request.intent)
        && rule.conditions().iter().all(|(key, expected)| {
            request
                .attributes
                .get(key)
                .is_some_and(|actual| values_equal(actual, expected))
        })
}

// ============================================================================
// Projection
// ============================================================================

struct Projection {
    fields: Record,
    masked: usize,
    omitted: usize,
}

/// Applies the rule's dispositions to each resource field in resource order.
fn project(rule: &Rule, resource: &Record) -> Projection {
    let mut fields = Map::new();
    let mut masked = 0;
    let mut omitted = 0;

    for (name, value) in resource {
        // The metadata key is reserved; record data never occupies it.
        if name == META_KEY {
            warn!("Resource field '{META_KEY}' is reserved and was dropped");
            omitted += 1;
            continue;
        }

        let disposition = rule.disposition(name);
        if !disposition.is_visible() {
            omitted += 1;
            continue;
        }

        let projected = if disposition == Disposition::Mask {
            masked += 1;
            Value::String(REDACTION_MARKER.to_string())
        } else {
            value.clone()
        };
        fields.insert(name.clone(), projected);
    }

    // Postcondition: output keys are a subset of resource keys
    debug_assert!(fields.keys().all(|k| resource.contains_key(k)));

    Projection {
        fields,
        masked,
        omitted,
    }
}

/// Computes `now + ttl` when the rule grants provisional access and the
/// request carries a justification.
///
/// Expiries past [`latest_expiry`] are clamped to it so `_meta.expires_at`
/// always renders as a four-digit-year timestamp.
fn justification_expiry<C: Clock + ?Sized>(
    rule: &Rule,
    request: &AccessRequest,
    clock: &C,
) -> Option<NaiveDateTime> {
    let ttl = rule.justification_ttl()?;
    if !request.has_justification() {
        return None;
    }

    let latest = latest_expiry();
    let expiry = clock
        .now()
        .checked_add_signed(Duration::minutes(i64::from(ttl)))
        .map_or(latest, |at| at.min(latest));
    Some(expiry)
}

/// `9999-12-31T23:59:59.999999`, the last instant [`EXPIRY_FORMAT`] renders
/// without a sign or extra year digits.
///
/// [`EXPIRY_FORMAT`]: crate::clock::EXPIRY_FORMAT
fn latest_expiry() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(9999, 12, 31)
        .and_then(|date| date.and_hms_micro_opt(23, 59, 59, 999_999))
        .unwrap_or(NaiveDateTime::MAX)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::JUSTIFICATION_ATTRIBUTE;
    use crate::clock::FixedClock;
    use chrono::{Local, NaiveDate};
    use serde_json::json;

    /// Helper: the patient record used across scenarios.
    fn sample_resource() -> Record {
        record(json!({
            "name": "John Doe",
            "dob": "1980-01-01",
            "diagnosis": "Hypertension",
            "notes": "Patient needs follow-up",
            "insurance_number": "INS12345",
            "appointment_time": "2023-11-15 10:00"
        }))
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn fixed_clock() -> FixedClock {
        FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
        )
    }

    fn receptionist_rule() -> Rule {
        Rule::builder("receptionist", "treatment")
            .allow(["name", "dob", "appointment_time"])
            .mask(["diagnosis", "notes"])
            .deny(["insurance_number"])
            .condition("active_shift_only", true)
            .build()
            .unwrap()
    }

    fn billing_rule() -> Rule {
        Rule::builder("billing_admin", "billing")
            .allow(["name", "insurance_number"])
            .mask(["diagnosis"])
            .justification_ttl(60)
            .build()
            .unwrap()
    }

    #[test]
    fn test_matching_rule_applies_dispositions() {
        let request = AccessRequest::new("receptionist", "treatment")
            .with_attribute("active_shift_only", true)
            .with_resource(sample_resource());

        let result = evaluate(&request, &[receptionist_rule()], &fixed_clock());

        assert_eq!(result["name"], json!("John Doe"));
        assert_eq!(result["dob"], json!("1980-01-01"));
        assert_eq!(result["appointment_time"], json!("2023-11-15 10:00"));
        assert_eq!(result["diagnosis"], json!(REDACTION_MARKER));
        assert_eq!(result["notes"], json!(REDACTION_MARKER));
        assert!(!result.contains_key("insurance_number"));
    }

    #[test]
    fn test_non_matching_role_denies_all() {
        let request = AccessRequest::new("janitor", "treatment")
            .with_attribute("active_shift_only", true)
            .with_resource(sample_resource());

        let evaluation = decide(&request, &[receptionist_rule()], &fixed_clock());
        assert!(evaluation.is_default_deny());
        assert!(evaluation.into_view().is_empty());
    }

    #[test]
    fn test_non_matching_intent_denies_all() {
        let request = AccessRequest::new("receptionist", "research")
            .with_attribute("active_shift_only", true)
            .with_resource(sample_resource());

        assert!(evaluate(&request, &[receptionist_rule()], &fixed_clock()).is_empty());
    }

    #[test]
    fn test_condition_gating() {
        let rule = Rule::builder("receptionist", "treatment")
            .allow(["name", "dob"])
            .condition("active_shift_only", true)
            .build()
            .unwrap();
        let resource = record(json!({"name": "Lisa Chang", "dob": "1983-09-22"}));

        let on_shift = AccessRequest::new("receptionist", "treatment")
            .with_attribute("active_shift_only", true)
            .with_resource(resource.clone());
        let result = evaluate(&on_shift, std::slice::from_ref(&rule), &fixed_clock());
        assert_eq!(
            Value::Object(result),
            json!({"name": "Lisa Chang", "dob": "1983-09-22"})
        );

        let off_shift = AccessRequest::new("receptionist", "treatment")
            .with_attribute("active_shift_only", false)
            .with_resource(resource);
        assert!(evaluate(&off_shift, &[rule], &fixed_clock()).is_empty());
    }

    #[test]
    fn test_missing_condition_attribute_fails_match() {
        let request =
            AccessRequest::new("receptionist", "treatment").with_resource(sample_resource());
        assert!(evaluate(&request, &[receptionist_rule()], &fixed_clock()).is_empty());
    }

    #[test]
    fn test_condition_does_not_coerce_truthiness() {
        let request = AccessRequest::new("receptionist", "treatment")
            .with_attribute("active_shift_only", 1)
            .with_resource(sample_resource());
        assert!(evaluate(&request, &[receptionist_rule()], &fixed_clock()).is_empty());

        let request = AccessRequest::new("receptionist", "treatment")
            .with_attribute("active_shift_only", "true")
            .with_resource(sample_resource());
        assert!(evaluate(&request, &[receptionist_rule()], &fixed_clock()).is_empty());
    }

    #[test]
    fn test_masking_case() {
        let rule = Rule::builder("nurse", "treatment")
            .allow(["name"])
            .mask(["diagnosis"])
            .deny(["insurance_number"])
            .build()
            .unwrap();
        let request = AccessRequest::new("nurse", "treatment").with_resource(record(json!({
            "name": "X",
            "diagnosis": "Asthma",
            "insurance_number": "123"
        })));

        let result = evaluate(&request, &[rule], &fixed_clock());
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"name":"X","diagnosis":"***"}"#
        );
    }

    #[test]
    fn test_mask_beats_allow_and_deny_beats_both() {
        let rule = Rule::builder("nurse", "treatment")
            .allow(["name", "diagnosis", "ssn"])
            .mask(["diagnosis", "ssn"])
            .deny(["ssn"])
            .build()
            .unwrap();
        let request = AccessRequest::new("nurse", "treatment").with_resource(record(json!({
            "name": "X",
            "diagnosis": "Asthma",
            "ssn": "123-45-6789"
        })));

        let result = evaluate(&request, &[rule], &fixed_clock());
        assert_eq!(result["diagnosis"], json!(REDACTION_MARKER));
        assert!(!result.contains_key("ssn"));
    }

    #[test]
    fn test_unlisted_fields_are_dropped() {
        let rule = Rule::builder("nurse", "treatment")
            .allow(["name"])
            .build()
            .unwrap();
        let request = AccessRequest::new("nurse", "treatment").with_resource(sample_resource());

        let result = evaluate(&request, &[rule], &fixed_clock());
        assert_eq!(result.len(), 1);
        assert!(result.contains_key("name"));
    }

    #[test]
    fn test_wildcard_allow_returns_resource() {
        let rule = Rule::builder("doctor", "treatment").allow_all().build().unwrap();
        let request = AccessRequest::new("doctor", "treatment").with_resource(sample_resource());

        let result = evaluate(&request, &[rule], &fixed_clock());
        assert_eq!(result, sample_resource());
    }

    #[test]
    fn test_first_match_wins() {
        let restrictive = Rule::builder("nurse", "treatment")
            .allow(["name"])
            .mask(["diagnosis"])
            .build()
            .unwrap();
        let permissive = Rule::builder("nurse", "treatment")
            .allow(["name", "diagnosis"])
            .build()
            .unwrap();
        let request = AccessRequest::new("nurse", "treatment")
            .with_resource(record(json!({"name": "John Doe", "diagnosis": "Hypertension"})));

        let evaluation = decide(&request, &[restrictive, permissive], &fixed_clock());
        assert_eq!(evaluation.matched_rule, Some(0));
        assert_eq!(
            Value::Object(evaluation.into_view()),
            json!({"name": "John Doe", "diagnosis": REDACTION_MARKER})
        );
    }

    #[test]
    fn test_later_rule_used_when_earlier_conditions_fail() {
        let gated = receptionist_rule();
        let fallback = Rule::builder("receptionist", "treatment")
            .allow(["name"])
            .build()
            .unwrap();
        let request = AccessRequest::new("receptionist", "treatment")
            .with_attribute("active_shift_only", false)
            .with_resource(sample_resource());

        let evaluation = decide(&request, &[gated, fallback], &fixed_clock());
        assert_eq!(evaluation.matched_rule, Some(1));
        assert_eq!(evaluation.fields.len(), 1);
    }

    #[test]
    fn test_empty_rule_list_denies_all() {
        let request = AccessRequest::new("nurse", "treatment").with_resource(sample_resource());
        assert!(evaluate(&request, &[], &fixed_clock()).is_empty());
    }

    #[test]
    fn test_empty_request_role_never_matches() {
        let rule = Rule::builder("nurse", "treatment").allow_all().build().unwrap();
        let request = AccessRequest::new("", "").with_resource(sample_resource());
        assert!(evaluate(&request, &[rule], &fixed_clock()).is_empty());
    }

    #[test]
    fn test_justification_sets_expiry_from_clock() {
        let request = AccessRequest::new("billing_admin", "billing")
            .with_attribute(JUSTIFICATION_ATTRIBUTE, "Monthly billing review")
            .with_resource(sample_resource());

        let result = Engine::with_clock(fixed_clock()).evaluate(&request, &[billing_rule()]);

        assert_eq!(result["name"], json!("John Doe"));
        assert_eq!(result["insurance_number"], json!("INS12345"));
        assert_eq!(result["diagnosis"], json!(REDACTION_MARKER));
        assert_eq!(
            result[META_KEY],
            json!({"expires_at": "2024-01-01T11:00:00.000000"})
        );
        assert_eq!(result.keys().last().map(String::as_str), Some(META_KEY));
    }

    #[test]
    fn test_justification_expiry_against_wall_clock() {
        let request = AccessRequest::new("billing_admin", "billing")
            .with_attribute(JUSTIFICATION_ATTRIBUTE, "review")
            .with_resource(sample_resource());

        let result = Engine::new().evaluate(&request, &[billing_rule()]);
        let expires_at = result[META_KEY][EXPIRES_AT_KEY].as_str().unwrap();
        let expires_at = NaiveDateTime::parse_from_str(expires_at, crate::clock::EXPIRY_FORMAT)
            .expect("expires_at should be ISO-8601");

        let minutes = (expires_at - Local::now().naive_local()).num_seconds() as f64 / 60.0;
        assert!((59.0..=61.0).contains(&minutes), "got {minutes} minutes");
    }

    #[test]
    fn test_ttl_without_justification_has_no_meta() {
        let request =
            AccessRequest::new("billing_admin", "billing").with_resource(sample_resource());
        let result = evaluate(&request, &[billing_rule()], &fixed_clock());
        assert!(!result.contains_key(META_KEY));
    }

    #[test]
    fn test_zero_ttl_expires_now() {
        let rule = Rule::builder("billing_admin", "billing")
            .allow(["name"])
            .justification_ttl(0)
            .build()
            .unwrap();
        let request = AccessRequest::new("billing_admin", "billing")
            .with_attribute(JUSTIFICATION_ATTRIBUTE, "audit")
            .with_resource(sample_resource());

        let evaluation = decide(&request, &[rule], &fixed_clock());
        assert_eq!(evaluation.expires_at, Some(fixed_clock().now()));
        assert_eq!(
            evaluation.into_view()[META_KEY],
            json!({"expires_at": "2024-01-01T10:00:00.000000"})
        );
    }

    #[test]
    fn test_far_future_expiry_is_clamped() {
        let rule = Rule::builder("billing_admin", "billing")
            .allow(["name"])
            .justification_ttl(u32::MAX)
            .build()
            .unwrap();
        let request = AccessRequest::new("billing_admin", "billing")
            .with_attribute(JUSTIFICATION_ATTRIBUTE, "audit")
            .with_resource(sample_resource());

        let result = evaluate(&request, &[rule], &fixed_clock());
        let expires_at = result[META_KEY][EXPIRES_AT_KEY].as_str().unwrap();
        assert_eq!(expires_at, "9999-12-31T23:59:59.999999");
        assert!(FixedClock::parse(expires_at).is_some());
    }

    #[test]
    fn test_expiry_clamps_at_latest_instant_from_max_clock() {
        let rule = Rule::builder("billing_admin", "billing")
            .allow(["name"])
            .justification_ttl(1)
            .build()
            .unwrap();
        let request = AccessRequest::new("billing_admin", "billing")
            .with_attribute(JUSTIFICATION_ATTRIBUTE, "audit")
            .with_resource(sample_resource());

        let evaluation = decide(&request, &[rule], &FixedClock::new(NaiveDateTime::MAX));
        assert_eq!(evaluation.expires_at, Some(latest_expiry()));
    }

    #[test]
    fn test_justification_without_ttl_has_no_meta() {
        let rule = Rule::builder("nurse", "treatment")
            .allow(["name", "diagnosis"])
            .mask(["insurance_number"])
            .build()
            .unwrap();
        let request = AccessRequest::new("nurse", "treatment")
            .with_attribute(JUSTIFICATION_ATTRIBUTE, "Patient assessment")
            .with_resource(sample_resource());

        let result = evaluate(&request, &[rule], &fixed_clock());
        assert!(!result.contains_key(META_KEY));
    }

    #[test]
    fn test_empty_justification_has_no_meta() {
        let request = AccessRequest::new("billing_admin", "billing")
            .with_attribute(JUSTIFICATION_ATTRIBUTE, "")
            .with_resource(sample_resource());
        let result = evaluate(&request, &[billing_rule()], &fixed_clock());
        assert!(!result.contains_key(META_KEY));
    }

    #[test]
    fn test_resource_meta_field_is_reserved() {
        let rule = Rule::builder("doctor", "treatment").allow_all().build().unwrap();
        let request = AccessRequest::new("doctor", "treatment")
            .with_resource(record(json!({"name": "X", "_meta": {"source": "ehr"}})));

        let result = evaluate(&request, &[rule], &fixed_clock());
        assert_eq!(Value::Object(result), json!({"name": "X"}));
    }

    #[test]
    fn test_field_order_follows_resource() {
        let rule = Rule::builder("doctor", "treatment")
            .allow_all()
            .deny(["dob"])
            .build()
            .unwrap();
        let request = AccessRequest::new("doctor", "treatment").with_resource(sample_resource());

        let result = evaluate(&request, &[rule], &fixed_clock());
        let keys: Vec<&str> = result.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["name", "diagnosis", "notes", "insurance_number", "appointment_time"]
        );
    }

    #[test]
    fn test_evaluation_is_idempotent_under_fixed_clock() {
        let engine = Engine::with_clock(fixed_clock());
        let rules = [billing_rule()];
        let request = AccessRequest::new("billing_admin", "billing")
            .with_attribute(JUSTIFICATION_ATTRIBUTE, "audit")
            .with_resource(sample_resource());

        let first = serde_json::to_string(&engine.evaluate(&request, &rules)).unwrap();
        let second = serde_json::to_string(&engine.evaluate(&request, &rules)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_decision_reason_names_rule() {
        let request =
            AccessRequest::new("billing_admin", "billing").with_resource(sample_resource());
        let evaluation = decide(&request, &[billing_rule()], &fixed_clock());
        assert_eq!(evaluation.reason, "Matched rule #0 (billing_admin/billing)");
    }

    #[test]
    fn test_engine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
        assert_send_sync::<Engine<FixedClock>>();
        assert_send_sync::<Rule>();
    }
}
