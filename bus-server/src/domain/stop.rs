//! Bus stops.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::text::normalize;

/// Identifier of a stop in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub u64);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a stop record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopSource {
    /// Entered alongside the hand-maintained timetables.
    Curated,
    /// Registered while ingesting a directions response.
    Discovered,
}

/// A named stop with coordinates.
///
/// `normalized_name` is always derived from `name`; it is recomputed on
/// rename and on deserialisation, never trusted from input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StopRecord")]
pub struct Stop {
    pub id: StopId,
    name: String,
    normalized_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub source: StopSource,
}

impl Stop {
    /// Create a stop, deriving its normalised name.
    pub fn new(
        id: StopId,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        source: StopSource,
    ) -> Self {
        let name = name.into();
        let normalized_name = normalize(&name);
        Self {
            id,
            name,
            normalized_name,
            latitude,
            longitude,
            source,
        }
    }

    /// The stored display name, diacritics included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name folded for comparison.
    pub fn normalized_name(&self) -> &str {
        &self.normalized_name
    }

    /// Rename the stop, recomputing the normalised name.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.normalized_name = normalize(&self.name);
    }

    /// Coordinates as a "lat,lng" query string.
    pub fn lat_lng(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

/// Wire form of a stop; the normalised name is ignored if present.
#[derive(Deserialize)]
struct StopRecord {
    id: StopId,
    name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default = "default_source")]
    source: StopSource,
}

fn default_source() -> StopSource {
    StopSource::Curated
}

impl From<StopRecord> for Stop {
    fn from(r: StopRecord) -> Self {
        Stop::new(r.id, r.name, r.latitude, r.longitude, r.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_normalized_name() {
        let stop = Stop::new(StopId(1), "Povoação", 37.75, -25.25, StopSource::Curated);
        assert_eq!(stop.name(), "Povoação");
        assert_eq!(stop.normalized_name(), "povoacao");
    }

    #[test]
    fn rename_recomputes() {
        let mut stop = Stop::new(StopId(1), "Lagoa", 37.74, -25.57, StopSource::Curated);
        stop.rename("Água de Pau");
        assert_eq!(stop.normalized_name(), "agua de pau");
    }

    #[test]
    fn deserialize_ignores_stale_normalized_name() {
        let json = r#"{"id":3,"name":"Furnas","normalized_name":"bogus","latitude":37.77,"longitude":-25.31}"#;
        let stop: Stop = serde_json::from_str(json).unwrap();
        assert_eq!(stop.normalized_name(), "furnas");
        assert_eq!(stop.source, StopSource::Curated);
    }

    #[test]
    fn serialize_roundtrip() {
        let stop = Stop::new(StopId(9), "Nordeste", 37.83, -25.15, StopSource::Discovered);
        let json = serde_json::to_string(&stop).unwrap();
        let back: Stop = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stop);
    }

    #[test]
    fn lat_lng_query() {
        let stop = Stop::new(StopId(1), "Lagoa", 37.5, -25.5, StopSource::Curated);
        assert_eq!(stop.lat_lng(), "37.5,-25.5");
    }
}
