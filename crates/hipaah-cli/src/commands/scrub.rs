//! Free-text PHI scrubbing.

use anyhow::{Context, Result};
use hipaah::scrub_text;
use std::io::{self, Read};

/// Scrubs `text`, or stdin when no text is given, and prints the result.
pub fn run(text: Option<&str>) -> Result<()> {
    let input = match text {
        Some(text) => text.to_string(),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read text from stdin")?;
            buf
        }
    };

    let scrubbed = scrub_text(&input);
    tracing::debug!(
        input_chars = input.chars().count(),
        changed = scrubbed != input,
        "Scrubbed text"
    );
    print!("{scrubbed}");
    if !scrubbed.ends_with('\n') {
        println!();
    }
    Ok(())
}
