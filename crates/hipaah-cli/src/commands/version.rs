//! Version command implementation.

use crate::style::{print_header, print_labeled};
use hipaah::{DEFAULT_PATTERNS, REDACTION_MARKER};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prints the version, redaction defaults and the config files consulted.
pub fn run(config_files: &[PathBuf]) {
    print_header(&format!("hipaah {VERSION}"));
    println!("Field-level access control for health records.");
    println!();

    println!("Redaction:");
    print_labeled("Marker", REDACTION_MARKER);
    print_labeled("Built-in PHI patterns", &DEFAULT_PATTERNS.len().to_string());
    println!();

    println!("Config files (lowest precedence first):");
    for file in config_files {
        let state = if file.exists() { "found" } else { "absent" };
        print_labeled(state, &file.display().to_string());
    }
}
