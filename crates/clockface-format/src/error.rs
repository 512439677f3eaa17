//! Errors raised while parsing format strings.

use thiserror::Error;

/// Reasons a format string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("Format string is empty")]
    Empty,

    #[error("Unterminated quoted literal starting at byte {offset}")]
    UnterminatedQuote { offset: usize },
}
