//! HIPAAH command line.
//!
//! # Quick Start
//!
//! ```bash
//! # Check a policy file
//! hipaah validate policy.yaml
//!
//! # See what a nurse gets from a record
//! hipaah test-policy policy.yaml patient.json --role nurse --intent treatment
//!
//! # Scrub identifiers from free text
//! echo "Call 555-123-4567" | hipaah scrub
//! ```

mod commands;
mod style;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::config::OutputFormat;
use commands::test_policy::TestPolicyArgs;
use hipaah_config::{ConfigLoader, HipaahConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// HIPAAH - field-level access control for health records.
#[derive(Parser)]
#[command(name = "hipaah")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding hipaah.toml.
    #[arg(long, global = true, default_value = ".")]
    project: PathBuf,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Evaluate a policy file against a JSON record.
    ///
    /// With a single file argument, that file is the input record and the
    /// policy comes from `policy.path` in configuration.
    TestPolicy {
        /// [POLICY_FILE] INPUT_FILE: optional policy file, then the JSON
        /// object to evaluate.
        #[arg(value_name = "FILE", num_args = 1..=2, required = true)]
        files: Vec<PathBuf>,

        /// Requester role.
        #[arg(long)]
        role: String,

        /// Purpose of access.
        #[arg(long)]
        intent: String,

        /// Request attributes as a JSON object.
        #[arg(long, default_value = "{}")]
        attributes: String,

        /// Comma-separated keys to mask in the output and logs.
        #[arg(long, value_delimiter = ',')]
        redact_fields: Vec<String>,

        /// Evaluate as of this local time (e.g. 2024-01-01T10:00:00).
        #[arg(long)]
        at: Option<String>,
    },

    /// Load a policy file and list its rules.
    Validate {
        /// Path to the policy file. Defaults to `policy.path` from configuration.
        policy_file: Option<PathBuf>,
    },

    /// Scrub PHI patterns from text (reads stdin when TEXT is omitted).
    Scrub {
        /// Text to scrub.
        text: Option<String>,
    },

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the merged configuration.
    Show {
        /// Output format.
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        style::disable_color();
    }

    let loader = ConfigLoader::new().with_project_dir(&cli.project);
    let config_files = loader.config_files();
    let config = loader.load();
    let level = config
        .as_ref()
        .map_or("info", |c: &HipaahConfig| c.logging.level.as_str());

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    let result = match cli.command {
        Commands::Version => {
            commands::version::run(&config_files);
            Ok(())
        }
        Commands::TestPolicy {
            mut files,
            role,
            intent,
            attributes,
            redact_fields,
            at,
        } => config.and_then(|config| {
            let input_file = files.pop().context("missing INPUT_FILE")?;
            commands::test_policy::run(
                TestPolicyArgs {
                    policy_file: files.pop(),
                    input_file,
                    role,
                    intent,
                    attributes,
                    redact_fields,
                    at,
                },
                &config,
            )
        }),
        Commands::Validate { policy_file } => config
            .and_then(|config| commands::validate::run(policy_file.as_deref(), &config)),
        Commands::Scrub { text } => commands::scrub::run(text.as_deref()),
        Commands::Config(ConfigCommands::Show { format }) => {
            config.and_then(|config| commands::config::show(&config, format))
        }
    };

    if let Err(err) = &result {
        style::print_error(&format!("{err:#}"));
        std::process::exit(1);
    }
    Ok(())
}
