//! Data transfer objects for web requests and responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{ClockTime, Stop, StopId, StopSource};
use crate::matcher::MatchQuery;

/// Query string of `GET /api/trips`.
#[derive(Debug, Default, Deserialize)]
pub struct TripSearchRequest {
    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub destination: String,

    /// Travel date as `YYYY-MM-DD`; without it every day type matches
    pub day: Option<String>,

    /// Earliest departure, `HHhMM` or `HH:MM`
    pub start: Option<String>,

    /// `"true"` for the whole stop sequence
    pub full: Option<String>,
}

impl TripSearchRequest {
    /// Validate into a match query and optional travel date.
    pub fn parse(&self) -> Result<(MatchQuery, Option<NaiveDate>), String> {
        let date = match self.day.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(day) => Some(
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map_err(|_| format!("Invalid day: {day} (expected YYYY-MM-DD)"))?,
            ),
        };

        let mut query = MatchQuery::new(self.origin.as_str(), self.destination.as_str())
            .with_full(self.full.as_deref().is_some_and(|f| f.eq_ignore_ascii_case("true")));

        if let Some(start) = self.start.as_deref().filter(|s| !s.trim().is_empty()) {
            let start = ClockTime::parse(start).map_err(|e| e.to_string())?;
            query = query.with_min_start(start);
        }

        Ok((query, date))
    }
}

/// Query string of the vote endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct VoteRequest {
    /// The rider is changing an earlier opposite vote
    #[serde(default)]
    pub switch: bool,
}

/// A stop in `GET /api/stops`.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub id: StopId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub source: StopSource,
}

impl From<&Stop> for StopResult {
    fn from(stop: &Stop) -> Self {
        Self {
            id: stop.id,
            name: stop.name().to_string(),
            latitude: stop.latitude,
            longitude: stop.longitude,
            source: stop.source,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(day: Option<&str>, start: Option<&str>, full: Option<&str>) -> TripSearchRequest {
        TripSearchRequest {
            origin: "Lagoa".to_string(),
            destination: "Furnas".to_string(),
            day: day.map(str::to_string),
            start: start.map(str::to_string),
            full: full.map(str::to_string),
        }
    }

    #[test]
    fn no_day_means_any_day() {
        let (query, date) = request(None, None, None).parse().unwrap();
        assert_eq!(date, None);
        assert_eq!(query.day_type, None);
        assert_eq!(query.min_start, None);
        assert!(!query.full);
    }

    #[test]
    fn parses_day_start_and_full() {
        let (query, date) = request(Some("2024-06-08"), Some("08:30"), Some("TRUE"))
            .parse()
            .unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 8));
        assert_eq!(query.min_start, ClockTime::from_hm(8, 30));
        assert!(query.full);

        let (query, _) = request(None, Some("08h30"), None).parse().unwrap();
        assert_eq!(query.min_start, ClockTime::from_hm(8, 30));
    }

    #[test]
    fn rejects_bad_day_and_start() {
        assert!(request(Some("03/06/2024"), None, None).parse().is_err());
        assert!(request(None, Some("25h00"), None).parse().is_err());
    }

    #[test]
    fn stop_result_from_stop() {
        let stop = Stop::new(StopId(3), "Povoação", 37.75, -25.25, StopSource::Curated);
        let result = StopResult::from(&stop);
        assert_eq!(result.name, "Povoação");
        assert_eq!(result.id, StopId(3));
    }
}
