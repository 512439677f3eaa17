//! Date/time fields and their textual rendering.

use chrono::{Datelike, NaiveDateTime, Timelike};

/// A date or time value substituted into the rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Hour of the day; `twelve_hour` selects the 1-12 range
    Hour { padded: bool, twelve_hour: bool },
    Minute { padded: bool },
    Second { padded: bool },
    /// Milliseconds; padded to three digits
    Millisecond { padded: bool },
    AmPm { uppercase: bool },
    Day { padded: bool },
    /// Weekday name, abbreviated unless `long`
    Weekday { long: bool },
    Month { padded: bool },
    /// Month name, abbreviated unless `long`
    MonthName { long: bool },
    /// Four-digit year when `long`, otherwise the last two digits
    Year { long: bool },
}

impl Field {
    /// Text shown for `time`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use chrono::NaiveDate;
    /// # use clockface_format::Field;
    /// let time = NaiveDate::from_ymd_opt(2024, 3, 9)
    ///     .and_then(|date| date.and_hms_opt(14, 5, 0))
    ///     .unwrap();
    /// let hour = Field::Hour { padded: true, twelve_hour: true };
    /// assert_eq!(hour.render(&time), "02");
    /// assert_eq!(Field::MonthName { long: false }.render(&time), "Mar");
    /// ```
    pub fn render(&self, time: &NaiveDateTime) -> String {
        match *self {
            Self::Hour {
                padded,
                twelve_hour,
            } => {
                let hour = if twelve_hour {
                    time.hour12().1
                } else {
                    time.hour()
                };
                number(hour, padded, 2)
            }
            Self::Minute { padded } => number(time.minute(), padded, 2),
            Self::Second { padded } => number(time.second(), padded, 2),
            Self::Millisecond { padded } => {
                number(time.nanosecond() / 1_000_000 % 1000, padded, 3)
            }
            Self::AmPm { uppercase } => {
                let text = if time.hour12().0 { "PM" } else { "AM" };
                if uppercase {
                    text.to_string()
                } else {
                    text.to_lowercase()
                }
            }
            Self::Day { padded } => number(time.day(), padded, 2),
            Self::Weekday { long } => time.format(if long { "%A" } else { "%a" }).to_string(),
            Self::Month { padded } => number(time.month(), padded, 2),
            Self::MonthName { long } => time.format(if long { "%B" } else { "%b" }).to_string(),
            Self::Year { long } => {
                if long {
                    format!("{:04}", time.year())
                } else {
                    format!("{:02}", time.year().rem_euclid(100))
                }
            }
        }
    }

    /// Whether the field is the AM/PM marker
    pub fn is_am_pm(&self) -> bool {
        matches!(self, Self::AmPm { .. })
    }
}

fn number(value: u32, padded: bool, width: usize) -> String {
    if padded {
        format!("{value:0width$}")
    } else {
        value.to_string()
    }
}
