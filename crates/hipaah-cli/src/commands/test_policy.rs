//! Evaluate a policy file against a sample record.

use anyhow::{Context, Result, anyhow, bail};
use hipaah::{Attributes, Client, Clock, FixedClock, Record, SafeLogger};
use hipaah_config::HipaahConfig;
use serde_json::Value;
use std::path::PathBuf;

pub struct TestPolicyArgs {
    /// Falls back to `policy.path` when absent.
    pub policy_file: Option<PathBuf>,
    pub input_file: PathBuf,
    pub role: String,
    pub intent: String,
    pub attributes: String,
    pub redact_fields: Vec<String>,
    pub at: Option<String>,
}

/// Evaluates the input record and prints the filtered view as JSON.
///
/// Keys in `--redact-fields` (plus `logging.redact_fields` from config) are
/// masked in both the printed view and the decision log line.
pub fn run(args: TestPolicyArgs, config: &HipaahConfig) -> Result<()> {
    let policy_file = config.policy.resolve_file(args.policy_file.as_deref())?;
    let rules = config
        .policy
        .load_rules(&policy_file)
        .with_context(|| format!("Failed to load policy {}", policy_file.display()))?;

    let text = std::fs::read_to_string(&args.input_file)
        .with_context(|| format!("Failed to read input {}", args.input_file.display()))?;
    let resource: Record = parse_object(&text)
        .with_context(|| format!("Invalid input {}", args.input_file.display()))?;
    let attributes: Attributes =
        parse_object(&args.attributes).context("Invalid --attributes")?;

    let clock: Box<dyn Clock> = match args.at.as_deref() {
        Some(at) => Box::new(
            FixedClock::parse(at).ok_or_else(|| anyhow!("Invalid --at timestamp '{at}'"))?,
        ),
        None => config.clock()?,
    };

    let mut redact_fields = args.redact_fields;
    redact_fields.extend(config.logging.redact_fields.iter().cloned());
    redact_fields.retain(|f| !f.is_empty());
    let logger = SafeLogger::new(redact_fields);

    let client = Client::with_clock(clock)
        .with_rules(rules)
        .with_logger(logger.clone());
    let view = client.evaluate(resource, &args.role, &args.intent, &attributes)?;

    let redacted = logger.redact(&view);
    logger.info("Access decision", &redacted);
    println!("{}", serde_json::to_string_pretty(&Value::Object(redacted))?);
    Ok(())
}

fn parse_object(text: &str) -> Result<serde_json::Map<String, Value>> {
    match serde_json::from_str(text)? {
        Value::Object(map) => Ok(map),
        other => bail!("expected a JSON object, got {}", kind(&other)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
