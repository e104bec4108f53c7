//! Semantic color palette for terminal output.

use owo_colors::{OwoColorize, Stream, Style};
use std::fmt::Display;

/// Semantic styling for anything displayable.
///
/// Each style is applied only when the target stream supports color.
pub trait SemanticStyle {
    /// Green bold, for stdout.
    fn success(&self) -> String;
    /// Red bold, for stderr.
    fn error(&self) -> String;
    fn muted(&self) -> String;
    fn header(&self) -> String;
    /// Blue, for paths and identifiers.
    fn code(&self) -> String;
}

impl<T: Display> SemanticStyle for T {
    fn success(&self) -> String {
        styled(self, Stream::Stdout, Style::new().green().bold())
    }

    fn error(&self) -> String {
        styled(self, Stream::Stderr, Style::new().red().bold())
    }

    fn muted(&self) -> String {
        styled(self, Stream::Stdout, Style::new().dimmed())
    }

    fn header(&self) -> String {
        styled(self, Stream::Stdout, Style::new().bold())
    }

    fn code(&self) -> String {
        styled(self, Stream::Stdout, Style::new().blue())
    }
}

fn styled<T: Display>(value: &T, stream: Stream, style: Style) -> String {
    value
        .if_supports_color(stream, |text| text.style(style))
        .to_string()
}
