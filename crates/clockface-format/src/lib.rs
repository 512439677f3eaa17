//! Clockface Format Strings
//!
//! This crate turns a Qt-style date/time format string into a sequence of
//! [`FormatItem`]s and replays it for a given instant through a
//! [`FormatSink`]. It includes:
//!
//! - **Parsing**: [`TimeFormat::parse`] (built on `winnow`)
//! - **Fields**: [`Field`] rendering via `chrono`
//! - **Visiting**: [`FormatSink`] callbacks for literals, separators, token
//!   boundaries and line breaks
//!
//! # Syntax
//!
//! | Pattern | Meaning |
//! |---------|---------|
//! | `h` `hh` | hour (1-12 with an AM/PM field, 0-23 otherwise), `hh` padded |
//! | `H` `HH` | hour 0-23 |
//! | `m` `mm` | minute |
//! | `s` `ss` | second |
//! | `z` `zzz` | millisecond |
//! | `AP` `A` / `ap` `a` | AM/PM marker, upper/lower case |
//! | `d` `dd` `ddd` `dddd` | day, padded day, short/long weekday |
//! | `M` `MM` `MMM` `MMMM` | month, padded month, short/long month name |
//! | `yy` `yyyy` | two/four-digit year |
//! | `:` | separator (blinks, may be replaced by the skin) |
//! | `'text'` | literal text, `''` for a quote |
//! | newline | line break |
//!
//! # Example
//!
//! ```
//! # use chrono::NaiveDate;
//! # use clockface_format::TimeFormat;
//! let format = TimeFormat::parse("hh:mm AP").unwrap();
//! let time = NaiveDate::from_ymd_opt(2024, 1, 1)
//!     .and_then(|date| date.and_hms_opt(15, 4, 0))
//!     .unwrap();
//! assert_eq!(format.render(&time), "03:04 PM");
//! ```

mod error;
mod field;
mod parser;

use std::{fmt, str::FromStr};

use chrono::NaiveDateTime;

pub use error::FormatError;
pub use field::Field;

/// The reserved separator character.
pub const SEPARATOR: char = ':';

/// One element of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatItem {
    /// Text shown as is
    Literal(String),
    /// The separator character
    Separator(char),
    LineBreak,
    /// A date/time field and the pattern it was written as
    Field { field: Field, pattern: &'static str },
}

impl FormatItem {
    fn is_am_pm(&self) -> bool {
        matches!(self, Self::Field { field, .. } if field.is_am_pm())
    }
}

/// Receives the characters of a formatted instant.
///
/// Characters produced by a field are reported through [`FormatSink::literal`]
/// between [`FormatSink::token_start`] and [`FormatSink::token_end`], which
/// carry the field's pattern (e.g. `"ss"`).
pub trait FormatSink {
    fn literal(&mut self, ch: char);

    fn separator(&mut self, ch: char);

    fn token_start(&mut self, _pattern: &str) {}

    fn token_end(&mut self, _pattern: &str) {}

    fn line_break(&mut self);
}

/// A parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFormat {
    source: String,
    items: Vec<FormatItem>,
}

impl TimeFormat {
    /// Parses a format string.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Empty`] for an empty string and
    /// [`FormatError::UnterminatedQuote`] when a quoted literal is not closed.
    pub fn parse(source: &str) -> Result<Self, FormatError> {
        let items = parser::parse_items(source)?;
        Ok(Self {
            source: source.to_string(),
            items,
        })
    }

    /// The string this format was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn items(&self) -> &[FormatItem] {
        &self.items
    }

    /// Whether the format has more than one line
    pub fn is_multi_line(&self) -> bool {
        self.items.contains(&FormatItem::LineBreak)
    }

    /// Number of separators in the format
    pub fn separator_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, FormatItem::Separator(_)))
            .count()
    }

    /// Replays the format for `time` into `sink`.
    pub fn visit<S: FormatSink + ?Sized>(&self, time: &NaiveDateTime, sink: &mut S) {
        for item in &self.items {
            match item {
                FormatItem::Literal(text) => text.chars().for_each(|ch| sink.literal(ch)),
                FormatItem::Separator(ch) => sink.separator(*ch),
                FormatItem::LineBreak => sink.line_break(),
                FormatItem::Field { field, pattern } => {
                    sink.token_start(pattern);
                    field
                        .render(time)
                        .chars()
                        .for_each(|ch| sink.literal(ch));
                    sink.token_end(pattern);
                }
            }
        }
    }

    /// Plain-text rendering of `time`.
    pub fn render(&self, time: &NaiveDateTime) -> String {
        let mut text = TextSink::default();
        self.visit(time, &mut text);
        text.0
    }
}

impl FromStr for TimeFormat {
    type Err = FormatError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Default)]
struct TextSink(String);

impl FormatSink for TextSink {
    fn literal(&mut self, ch: char) {
        self.0.push(ch);
    }

    fn separator(&mut self, ch: char) {
        self.0.push(ch);
    }

    fn line_break(&mut self) {
        self.0.push('\n');
    }
}

#[cfg(test)]
mod format_tests;
