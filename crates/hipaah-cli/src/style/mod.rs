//! Terminal styling.
//!
//! Colors follow owo-colors' stream detection, so piped output and
//! `NO_COLOR` stay plain. `--no-color` forces plain output everywhere.

pub mod colors;
pub mod output;

pub use output::*;

/// Forces plain output regardless of terminal support.
pub fn disable_color() {
    owo_colors::set_override(false);
}
