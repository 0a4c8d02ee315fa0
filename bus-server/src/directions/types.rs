//! Directions API response DTOs.
//!
//! These map onto the transit directions JSON payload. Only the fields the
//! ingestor reads are modelled; everything else is ignored. Missing arrays
//! default to empty because the provider omits them on non-`OK` responses.

use serde::{Deserialize, Serialize};

/// Top-level directions response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResponse {
    /// `"OK"` on success; `"ZERO_RESULTS"`, `"REQUEST_DENIED"` etc. otherwise.
    pub status: String,

    /// Route alternatives.
    #[serde(default)]
    pub routes: Vec<Route>,

    /// Provider-supplied explanation for a non-`OK` status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DirectionsResponse {
    /// Whether the provider reported success.
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// One route alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub legs: Vec<Leg>,
}

/// A leg between two waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    /// Absent for legs without a scheduled departure (e.g. walking only).
    pub departure_time: Option<TimeValue>,
    pub arrival_time: Option<TimeValue>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A provider timestamp with its display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeValue {
    /// Local clock time, "8:05 AM" or "08:05" depending on language.
    pub text: String,
    /// Unix timestamp in seconds.
    pub value: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// A single instruction within a leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// `"TRANSIT"`, `"WALKING"`, ...
    pub travel_mode: String,
    /// Present only for transit steps.
    pub transit_details: Option<TransitDetails>,
}

impl Step {
    pub fn is_transit(&self) -> bool {
        self.travel_mode == "TRANSIT"
    }
}

/// Vehicle ride details of a transit step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitDetails {
    pub departure_stop: TransitStop,
    pub arrival_stop: TransitStop,
    pub departure_time: TimeValue,
    pub arrival_time: TimeValue,
    pub line: Line,
}

/// A stop as named by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitStop {
    pub name: String,
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// The transit line of a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Short identifier, e.g. "C318". Some operators only set `name`.
    pub short_name: Option<String>,
    pub name: Option<String>,
}
