//! Timetable day types.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown day type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid day type: {0:?}")]
pub struct InvalidDayType(String);

/// Which timetable variant a trip runs on.
///
/// Holidays run the Sunday timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayType {
    Weekday,
    Saturday,
    Sunday,
}

impl DayType {
    /// Classify a calendar date.
    ///
    /// A holiday always runs the Sunday timetable, whatever its weekday.
    ///
    /// ```
    /// use bus_server::domain::DayType;
    /// use chrono::NaiveDate;
    ///
    /// let saturday = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    /// assert_eq!(DayType::classify(saturday, false), DayType::Saturday);
    /// assert_eq!(DayType::classify(saturday, true), DayType::Sunday);
    /// ```
    pub fn classify(date: NaiveDate, is_holiday: bool) -> Self {
        if is_holiday {
            return DayType::Sunday;
        }
        match date.weekday() {
            Weekday::Sat => DayType::Saturday,
            Weekday::Sun => DayType::Sunday,
            _ => DayType::Weekday,
        }
    }

    /// The stored label ("WEEKDAY", "SATURDAY", "SUNDAY").
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "WEEKDAY",
            DayType::Saturday => "SATURDAY",
            DayType::Sunday => "SUNDAY",
        }
    }
}

impl FromStr for DayType {
    type Err = InvalidDayType;

    /// Parse a stored label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEEKDAY" => Ok(DayType::Weekday),
            "SATURDAY" => Ok(DayType::Saturday),
            "SUNDAY" => Ok(DayType::Sunday),
            _ => Err(InvalidDayType(s.to_string())),
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Holidays always classify as Sunday.
        #[test]
        fn holiday_is_sunday(days in 0i64..20_000) {
            let d = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Duration::days(days);
            prop_assert_eq!(DayType::classify(d, true), DayType::Sunday);
        }

        /// Without a holiday the classification follows the weekday.
        #[test]
        fn follows_weekday(days in 0i64..20_000) {
            let d = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Duration::days(days);
            let expected = match d.weekday() {
                Weekday::Sat => DayType::Saturday,
                Weekday::Sun => DayType::Sunday,
                _ => DayType::Weekday,
            };
            prop_assert_eq!(DayType::classify(d, false), expected);
        }
    }
}
