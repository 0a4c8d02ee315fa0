//! Time-of-day handling for bus timetables.
//!
//! Timetables store departure times as "HHhMM" strings (e.g. "08h30").
//! Rider queries may use either "HHhMM" or "HH:MM", and the directions
//! provider reports times in 12h ("8:30 AM") or 24h ("08:30") form
//! depending on the requested language.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time {input:?}: {reason}")]
pub struct TimeError {
    input: String,
    reason: &'static str,
}

impl TimeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// A time of day with minute precision.
///
/// Ordering compares hour first, then minute. There is no date component,
/// so a trip leaving at 23h50 sorts after one leaving at 00h10.
///
/// # Examples
///
/// ```
/// use bus_server::domain::ClockTime;
///
/// let t = ClockTime::parse("08h30").unwrap();
/// assert_eq!(t.to_string(), "08h30");
/// assert_eq!(ClockTime::parse("08:30").unwrap(), t);
///
/// assert!(ClockTime::parse("24h00").is_err());
/// assert!(ClockTime::parse("0830").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Create a time from hour and minute components.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parse a timetable or query time.
    ///
    /// Accepts "HHhMM" and "HH:MM"; single-digit hours and whitespace around
    /// the separator ("8h 30") are tolerated.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let trimmed = s.trim();
        let (hour, minute) = trimmed
            .split_once(['h', 'H'])
            .or_else(|| trimmed.split_once(':'))
            .ok_or_else(|| TimeError::new(s, "expected HHhMM or HH:MM"))?;

        let hour = parse_component(hour).ok_or_else(|| TimeError::new(s, "invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new(s, "hour must be 0-23"));
        }

        let minute =
            parse_component(minute).ok_or_else(|| TimeError::new(s, "invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new(s, "minute must be 0-59"));
        }

        Self::from_hm(hour, minute).ok_or_else(|| TimeError::new(s, "invalid time"))
    }

    /// Parse a time as reported by the directions provider.
    ///
    /// The provider localises times: "8:05 AM", "8:05\u{202f}PM" or "20:05".
    ///
    /// ```
    /// use bus_server::domain::ClockTime;
    ///
    /// assert_eq!(ClockTime::parse_provider("8:05 PM").unwrap().to_string(), "20h05");
    /// assert_eq!(ClockTime::parse_provider("12:10 AM").unwrap().to_string(), "00h10");
    /// assert_eq!(ClockTime::parse_provider("07:45").unwrap().to_string(), "07h45");
    /// ```
    pub fn parse_provider(s: &str) -> Result<Self, TimeError> {
        // Some locales use a narrow no-break space before the meridiem.
        let cleaned: String = s
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();
        let cleaned = cleaned.trim();
        let upper = cleaned.to_ascii_uppercase();

        if upper.ends_with("AM") || upper.ends_with("PM") {
            let (clock, meridiem) = upper.split_at(upper.len() - 2);
            let compact = format!("{} {}", clock.trim(), meridiem);
            return NaiveTime::parse_from_str(&compact, "%I:%M %p")
                .map(Self)
                .map_err(|_| TimeError::new(s, "expected H:MM AM/PM"));
        }

        let (hour, minute) = cleaned
            .split_once(':')
            .ok_or_else(|| TimeError::new(s, "expected HH:MM"))?;
        let hour = parse_component(hour).ok_or_else(|| TimeError::new(s, "invalid hour digits"))?;
        let minute =
            parse_component(minute).ok_or_else(|| TimeError::new(s, "invalid minute digits"))?;
        Self::from_hm(hour, minute).ok_or_else(|| TimeError::new(s, "time out of range"))
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Converts to a NaiveTime.
    pub fn to_naive(&self) -> NaiveTime {
        self.0
    }
}

/// Parse a one- or two-digit clock component.
fn parse_component(s: &str) -> Option<u32> {
    let s = s.trim();
    if s.is_empty() || s.len() > 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}h{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}h{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
