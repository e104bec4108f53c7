//! Application-facing client.
//!
//! Holds a loaded rule set and an [`Engine`], and logs each decision through
//! a [`SafeLogger`] so masked keys never reach the log stream.

use crate::error::{ClientError, Result};
use hipaah_policy::{
    AccessRequest, Attributes, Clock, Engine, Record, Rule, SystemClock, load_rules,
};
use hipaah_redact::SafeLogger;
use rayon::prelude::*;
use serde_json::{Map, Value, json};
use std::path::Path;
use tracing::info;

/// Evaluates records against a loaded rule set.
///
/// A client starts with no rule set. Evaluating before one is loaded is an
/// error, while a loaded but empty rule set default-denies every request.
#[derive(Debug, Clone)]
pub struct Client<C = SystemClock> {
    engine: Engine<C>,
    rules: Option<Vec<Rule>>,
    logger: SafeLogger,
}

impl Client<SystemClock> {
    /// Creates a client on the local wall clock with no rules loaded.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Creates a client and loads rules from `path`.
    pub fn from_policy_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut client = Self::new();
        client.load_policy(path)?;
        Ok(client)
    }
}

impl Default for Client<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Client<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            engine: Engine::with_clock(clock),
            rules: None,
            logger: SafeLogger::default(),
        }
    }

    /// Replaces the rule set with `rules`.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Uses `logger` for decision events.
    #[must_use]
    pub fn with_logger(mut self, logger: SafeLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Loads rules from `path`, replacing any current rule set.
    ///
    /// Returns the number of rules loaded. On error the previous rule set is
    /// kept.
    pub fn load_policy(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let rules = load_rules(path)?;
        let count = rules.len();
        self.rules = Some(rules);
        Ok(count)
    }

    /// The loaded rules, or an empty slice if none were loaded.
    pub fn rules(&self) -> &[Rule] {
        self.rules.as_deref().unwrap_or_default()
    }

    pub fn is_loaded(&self) -> bool {
        self.rules.is_some()
    }

    /// Evaluates one resource.
    ///
    /// # Errors
    ///
    /// [`ClientError::NoPoliciesLoaded`] if no rule set was ever loaded.
    pub fn evaluate(
        &self,
        resource: Record,
        role: &str,
        intent: &str,
        attributes: &Attributes,
    ) -> Result<Record> {
        let rules = self.rules.as_deref().ok_or(ClientError::NoPoliciesLoaded)?;
        let request = AccessRequest::new(role, intent)
            .with_attributes(attributes.clone())
            .with_resource(resource);

        let evaluation = self.engine.decide(&request, rules);

        let mut event = Map::new();
        event.insert("result".to_string(), json!("success"));
        event.insert(
            "matched_rule".to_string(),
            evaluation.matched_rule.map_or(Value::Null, Value::from),
        );
        event.insert("fields".to_string(), Value::from(evaluation.fields.len()));
        self.logger
            .info(&format!("Policy evaluation for {role}/{intent}"), &event);

        Ok(evaluation.into_view())
    }

    /// Evaluates many resources in parallel under one role, intent and
    /// attribute set. Results are in input order.
    ///
    /// # Errors
    ///
    /// [`ClientError::NoPoliciesLoaded`] if no rule set was ever loaded.
    pub fn batch_evaluate(
        &self,
        resources: &[Record],
        role: &str,
        intent: &str,
        attributes: &Attributes,
    ) -> Result<Vec<Record>> {
        if self.rules.is_none() {
            return Err(ClientError::NoPoliciesLoaded);
        }

        let results = resources
            .par_iter()
            .map(|resource| self.evaluate(resource.clone(), role, intent, attributes))
            .collect::<Result<Vec<_>>>()?;

        info!(
            role,
            intent,
            resources = results.len(),
            "Batch evaluation complete"
        );
        Ok(results)
    }
}
