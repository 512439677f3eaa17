//! Error adapter for converting ClockError to miette diagnostics.
//!
//! This module provides the bridge between the library's error type and
//! miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use clockface::{ClockError, format::FormatError};

/// Adapter for [`ClockError`].
pub struct ErrorAdapter<'a>(pub &'a ClockError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            ClockError::Io(_) => "clockface::io",
            ClockError::Render(_) => "clockface::render",
            ClockError::Format(_) => "clockface::format",
            ClockError::Config(_) => "clockface::config",
            ClockError::Image(_) => "clockface::image",
            ClockError::Font(_) => "clockface::font",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            ClockError::Format(FormatError::UnterminatedQuote { .. }) => {
                "close the literal with `'`; write `''` for a quote character"
            }
            ClockError::Format(FormatError::Empty) => "use a format such as \"hh:mm\"",
            ClockError::Image(_) => "glyph images and image brushes must be PNG files",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Wraps `err` for rendering with miette.
pub fn to_reportable(err: &ClockError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let err = ClockError::Config("bad".to_string());
        let adapter = to_reportable(&err);
        assert_eq!(adapter.code().unwrap().to_string(), "clockface::config");
        assert!(adapter.help().is_none());
    }

    #[test]
    fn test_format_help() {
        let err = ClockError::Format(FormatError::UnterminatedQuote { offset: 3 });
        let adapter = to_reportable(&err);
        assert!(adapter.help().unwrap().to_string().contains("''"));
    }
}
