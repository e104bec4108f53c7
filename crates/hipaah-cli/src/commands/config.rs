//! Configuration management commands.

use crate::style::{print_header, print_labeled};
use anyhow::Result;
use clap::ValueEnum;
use hipaah_config::{ClockMode, HipaahConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Toml,
}

/// Show the merged configuration.
pub fn show(config: &HipaahConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Toml => {
            println!("{}", toml::to_string_pretty(config)?);
        }
        OutputFormat::Text => {
            print_header("HIPAAH Configuration");
            println!();

            println!("Policy:");
            print_labeled(
                "Path",
                &config
                    .policy
                    .path
                    .as_ref()
                    .map_or_else(|| "(none)".to_string(), |p| p.display().to_string()),
            );
            print_labeled(
                "Format",
                &config
                    .policy
                    .format
                    .map_or_else(|| "(from extension)".to_string(), |f| f.to_string()),
            );
            println!();

            println!("Evaluation:");
            let clock = match config.evaluation.clock {
                ClockMode::System => "system".to_string(),
                ClockMode::Fixed => format!(
                    "fixed at {}",
                    config.evaluation.fixed_time.as_deref().unwrap_or("?")
                ),
            };
            print_labeled("Clock", &clock);
            println!();

            println!("Logging:");
            print_labeled("Level", &config.logging.level);
            print_labeled(
                "Redact fields",
                &if config.logging.redact_fields.is_empty() {
                    "(none)".to_string()
                } else {
                    config.logging.redact_fields.join(", ")
                },
            );
        }
    }

    Ok(())
}
