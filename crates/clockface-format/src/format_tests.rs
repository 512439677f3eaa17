//! Tests for format parsing and replay through [`FormatSink`].

use chrono::{NaiveDate, NaiveDateTime};

use crate::{Field, FormatError, FormatItem, FormatSink, TimeFormat};

fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 30)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .unwrap()
}

/// Records every callback as a short event string.
#[derive(Default)]
struct EventSink(Vec<String>);

impl FormatSink for EventSink {
    fn literal(&mut self, ch: char) {
        self.0.push(ch.to_string());
    }

    fn separator(&mut self, ch: char) {
        self.0.push(format!("sep({ch})"));
    }

    fn token_start(&mut self, pattern: &str) {
        self.0.push(format!("<{pattern}>"));
    }

    fn token_end(&mut self, pattern: &str) {
        self.0.push(format!("</{pattern}>"));
    }

    fn line_break(&mut self) {
        self.0.push("br".to_string());
    }
}

mod parsing_tests {
    use super::*;

    #[test]
    fn test_empty_format_rejected() {
        assert_eq!(TimeFormat::parse(""), Err(FormatError::Empty));
    }

    #[test]
    fn test_items_of_simple_format() {
        let format = TimeFormat::parse("hh:mm").unwrap();
        assert_eq!(
            format.items(),
            &[
                FormatItem::Field {
                    field: Field::Hour {
                        padded: true,
                        twelve_hour: false
                    },
                    pattern: "hh"
                },
                FormatItem::Separator(':'),
                FormatItem::Field {
                    field: Field::Minute { padded: true },
                    pattern: "mm"
                },
            ]
        );
        assert_eq!(format.separator_count(), 1);
        assert!(!format.is_multi_line());
    }

    #[test]
    fn test_am_pm_switches_to_twelve_hour() {
        let format = TimeFormat::parse("h:mm ap").unwrap();
        assert!(matches!(
            format.items()[0],
            FormatItem::Field {
                field: Field::Hour {
                    twelve_hour: true,
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn test_quoted_separator_is_literal() {
        let format = TimeFormat::parse("hh':'mm").unwrap();
        assert_eq!(format.separator_count(), 0);
    }

    #[test]
    fn test_from_str_and_display() {
        let format: TimeFormat = "HH:mm\nss".parse().unwrap();
        assert_eq!(format.to_string(), "HH:mm\nss");
        assert!(format.is_multi_line());
    }
}

mod rendering_tests {
    use super::*;

    #[test]
    fn test_render_twenty_four_hour() {
        let format = TimeFormat::parse("hh:mm:ss").unwrap();
        assert_eq!(format.render(&at(21, 7, 9)), "21:07:09");
    }

    #[test]
    fn test_render_twelve_hour() {
        let format = TimeFormat::parse("h:mm AP").unwrap();
        assert_eq!(format.render(&at(21, 7, 9)), "9:07 PM");
    }

    #[test]
    fn test_render_date_and_line_break() {
        let format = TimeFormat::parse("HH:mm\nddd d MMM yyyy").unwrap();
        assert_eq!(format.render(&at(8, 0, 0)), "08:00\nSun 30 Jun 2024");
    }

    #[test]
    fn test_visit_reports_tokens_and_separators() {
        let format = TimeFormat::parse("H:mm\n's'").unwrap();
        let mut sink = EventSink::default();
        format.visit(&at(7, 5, 0), &mut sink);

        assert_eq!(
            sink.0,
            vec![
                "<H>", "7", "</H>", "sep(:)", "<mm>", "0", "5", "</mm>", "br", "s",
            ]
        );
    }
}

mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn check_plain_text_round_trips(text: &str) -> Result<(), TestCaseError> {
        let quoted = format!("'{}'", text.replace('\'', "''"));
        let format = TimeFormat::parse(&quoted).unwrap();
        prop_assert_eq!(format.render(&at(0, 0, 0)), text);
        prop_assert_eq!(format.separator_count(), 0);
        Ok(())
    }

    fn check_render_never_panics(source: &str) -> Result<(), TestCaseError> {
        if let Ok(format) = TimeFormat::parse(source) {
            let _ = format.render(&at(23, 59, 59));
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn quoted_text_renders_verbatim(text in "[a-zA-Z0-9 ':]{1,12}") {
            check_plain_text_round_trips(&text)?;
        }

        #[test]
        fn render_never_panics(source in "[hHmsazAPdMy: '\n]{0,16}") {
            check_render_never_panics(&source)?;
        }
    }
}
