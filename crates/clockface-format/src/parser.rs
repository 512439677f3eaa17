//! Format string tokenizer.
//!
//! The grammar, tried in this order at every position:
//!
//! - a line break character (`'\n'`)
//! - the separator character (`':'`)
//! - a quoted literal: `'...'`, where `''` inside stands for one quote and an
//!   empty pair (`''`) on its own is a literal quote
//! - a field pattern, longest first (`hh` before `h`, `AP` before `A`, ...)
//! - any other character, taken literally

use log::trace;
use winnow::{
    Parser as _,
    combinator::{alt, cut_err, delimited, repeat},
    error::{ContextError, ErrMode},
    token::{any, none_of},
};

use crate::{FormatItem, SEPARATOR, error::FormatError, field::Field};

type IResult<O> = Result<O, ErrMode<ContextError>>;

/// Parses `source` into format items.
///
/// Adjacent literal characters are merged. `h`/`hh` switch to the 24-hour
/// clock when the format contains no AM/PM field.
pub(crate) fn parse_items(source: &str) -> Result<Vec<FormatItem>, FormatError> {
    if source.is_empty() {
        return Err(FormatError::Empty);
    }

    let mut input = source;
    let mut items: Vec<FormatItem> = Vec::new();
    while !input.is_empty() {
        let offset = source.len() - input.len();
        let item = format_item
            .parse_next(&mut input)
            .map_err(|_| FormatError::UnterminatedQuote { offset })?;
        match (items.last_mut(), item) {
            (Some(FormatItem::Literal(text)), FormatItem::Literal(more)) => text.push_str(&more),
            (_, item) => items.push(item),
        }
    }

    if !items.iter().any(FormatItem::is_am_pm) {
        for item in items.iter_mut() {
            if let FormatItem::Field {
                field: Field::Hour { twelve_hour, .. },
                ..
            } = item
            {
                *twelve_hour = false;
            }
        }
    }

    trace!(source, items = items.len(); "Parsed format string");
    Ok(items)
}

fn format_item(input: &mut &str) -> IResult<FormatItem> {
    alt((
        '\n'.value(FormatItem::LineBreak),
        SEPARATOR.value(FormatItem::Separator(SEPARATOR)),
        quoted.map(FormatItem::Literal),
        time_field.map(|(field, pattern)| FormatItem::Field { field, pattern }),
        date_field.map(|(field, pattern)| FormatItem::Field { field, pattern }),
        any.map(|ch: char| FormatItem::Literal(ch.to_string())),
    ))
    .parse_next(input)
}

fn quoted(input: &mut &str) -> IResult<String> {
    let text: String = delimited(
        '\'',
        repeat(0.., alt(("''".value('\''), none_of('\'')))),
        cut_err('\''),
    )
    .parse_next(input)?;
    if text.is_empty() {
        Ok("'".to_string())
    } else {
        Ok(text)
    }
}

fn time_field(input: &mut &str) -> IResult<(Field, &'static str)> {
    alt((hour_field, clock_field, meridiem_field)).parse_next(input)
}

fn hour_field(input: &mut &str) -> IResult<(Field, &'static str)> {
    let hour = |padded, twelve_hour| Field::Hour {
        padded,
        twelve_hour,
    };
    alt((
        "hh".value((hour(true, true), "hh")),
        "h".value((hour(false, true), "h")),
        "HH".value((hour(true, false), "HH")),
        "H".value((hour(false, false), "H")),
    ))
    .parse_next(input)
}

/// Minutes, seconds and milliseconds.
fn clock_field(input: &mut &str) -> IResult<(Field, &'static str)> {
    alt((
        "mm".value((Field::Minute { padded: true }, "mm")),
        "m".value((Field::Minute { padded: false }, "m")),
        "ss".value((Field::Second { padded: true }, "ss")),
        "s".value((Field::Second { padded: false }, "s")),
        "zzz".value((Field::Millisecond { padded: true }, "zzz")),
        "z".value((Field::Millisecond { padded: false }, "z")),
    ))
    .parse_next(input)
}

fn meridiem_field(input: &mut &str) -> IResult<(Field, &'static str)> {
    alt((
        "AP".value((Field::AmPm { uppercase: true }, "AP")),
        "ap".value((Field::AmPm { uppercase: false }, "ap")),
        "A".value((Field::AmPm { uppercase: true }, "A")),
        "a".value((Field::AmPm { uppercase: false }, "a")),
    ))
    .parse_next(input)
}

fn date_field(input: &mut &str) -> IResult<(Field, &'static str)> {
    alt((day_field, month_field, year_field)).parse_next(input)
}

fn day_field(input: &mut &str) -> IResult<(Field, &'static str)> {
    alt((
        "dddd".value((Field::Weekday { long: true }, "dddd")),
        "ddd".value((Field::Weekday { long: false }, "ddd")),
        "dd".value((Field::Day { padded: true }, "dd")),
        "d".value((Field::Day { padded: false }, "d")),
    ))
    .parse_next(input)
}

fn month_field(input: &mut &str) -> IResult<(Field, &'static str)> {
    alt((
        "MMMM".value((Field::MonthName { long: true }, "MMMM")),
        "MMM".value((Field::MonthName { long: false }, "MMM")),
        "MM".value((Field::Month { padded: true }, "MM")),
        "M".value((Field::Month { padded: false }, "M")),
    ))
    .parse_next(input)
}

fn year_field(input: &mut &str) -> IResult<(Field, &'static str)> {
    alt((
        "yyyy".value((Field::Year { long: true }, "yyyy")),
        "yy".value((Field::Year { long: false }, "yy")),
    ))
    .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(text: &str) -> FormatItem {
        FormatItem::Literal(text.to_string())
    }

    #[test]
    fn test_quoted_literal_with_escaped_quote() {
        let mut input = "'o''clock' rest";
        assert_eq!(quoted(&mut input).unwrap(), "o'clock");
        assert_eq!(input, " rest");
    }

    #[test]
    fn test_empty_quote_pair_is_a_quote() {
        let items = parse_items("hh''mm").unwrap();
        assert_eq!(items[1], literal("'"));
    }

    #[test]
    fn test_unterminated_quote_reports_offset() {
        assert_eq!(
            parse_items("hh:mm 'oops"),
            Err(FormatError::UnterminatedQuote { offset: 6 })
        );
    }

    #[test]
    fn test_longest_pattern_wins() {
        let items = parse_items("dddd d MMM").unwrap();
        let patterns: Vec<&str> = items
            .iter()
            .filter_map(|item| match item {
                FormatItem::Field { pattern, .. } => Some(*pattern),
                _ => None,
            })
            .collect();
        assert_eq!(patterns, vec!["dddd", "d", "MMM"]);
    }

    #[test]
    fn test_every_time_pattern_parses() {
        let items = parse_items("H HH h hh m mm s ss z zzz AP ap A a").unwrap();
        let patterns: Vec<&str> = items
            .iter()
            .filter_map(|item| match item {
                FormatItem::Field { pattern, .. } => Some(*pattern),
                _ => None,
            })
            .collect();
        assert_eq!(
            patterns,
            vec![
                "H", "HH", "h", "hh", "m", "mm", "s", "ss", "z", "zzz", "AP", "ap", "A", "a"
            ]
        );
    }

    #[test]
    fn test_every_date_pattern_parses() {
        let items = parse_items("d.dd.ddd.dddd M.MM.MMM.MMMM yy.yyyy").unwrap();
        let fields = items
            .iter()
            .filter(|item| matches!(item, FormatItem::Field { .. }))
            .count();
        assert_eq!(fields, 10);
    }

    #[test]
    fn test_single_y_is_literal() {
        assert_eq!(parse_items("y").unwrap(), vec![literal("y")]);
    }

    #[test]
    fn test_literals_merge() {
        let items = parse_items("hh 'at' mm").unwrap();
        assert_eq!(items[1], literal(" at "));
    }
}
