//! Conversion from directions DTOs to candidate trips.
//!
//! Each route alternative becomes at most one trip. Its transit steps are
//! folded into a single ordered stop sequence; steps touching a stop outside
//! the service area are dropped whole, line label included.

use chrono::{DateTime, NaiveDate};
use tracing::debug;

use crate::domain::{ClockTime, DomainError, StopSequence, TimeError};

use super::geofence::GeoFence;
use super::types::{DirectionsResponse, LatLng, Route, TransitDetails};

/// Separator between line labels of a multi-bus route.
pub const LABEL_SEPARATOR: &str = " / ";

/// Prefix the provider puts in front of bus line names.
const LINE_PREFIX: char = 'C';

/// Error converting one route alternative.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// A transit time could not be read
    #[error("invalid transit time: {0}")]
    InvalidTime(#[from] TimeError),

    /// The accumulated stops do not form a valid sequence
    #[error("invalid stop sequence: {0}")]
    InvalidSequence(#[from] DomainError),
}

/// A trip assembled from one route alternative, not yet stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTrip {
    pub route_label: String,
    pub stops: StopSequence,
    /// Service date used for day-type classification.
    pub date: NaiveDate,
    /// Coordinates of every stop in `stops`, first sighting wins.
    pub stop_locations: Vec<(String, LatLng)>,
}

/// Outcome of converting a whole response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    pub trips: Vec<CandidateTrip>,
    /// Transit steps dropped by the geo-fence.
    pub fenced_steps: usize,
    /// Route alternatives that produced no usable trip.
    pub skipped_routes: usize,
}

/// Convert a provider response.
///
/// `fallback_date` is used for routes whose legs carry no departure time.
pub fn convert_response(
    response: &DirectionsResponse,
    fence: &GeoFence,
    fallback_date: NaiveDate,
) -> Conversion {
    let mut conversion = Conversion::default();

    for (index, route) in response.routes.iter().enumerate() {
        let mut fenced = 0;
        match convert_route(route, fence, fallback_date, &mut fenced) {
            Ok(trip) => conversion.trips.push(trip),
            Err(e) => {
                debug!(route = index, error = %e, "skipping route alternative");
                conversion.skipped_routes += 1;
            }
        }
        conversion.fenced_steps += fenced;
    }

    conversion
}

/// Convert one route alternative.
///
/// `fenced` is incremented for every transit step outside `fence`.
pub fn convert_route(
    route: &Route,
    fence: &GeoFence,
    fallback_date: NaiveDate,
    fenced: &mut usize,
) -> Result<CandidateTrip, ConversionError> {
    let mut builder = StopSequence::builder();
    let mut labels: Vec<String> = Vec::new();
    let mut stop_locations: Vec<(String, LatLng)> = Vec::new();

    let transit_steps = route
        .legs
        .iter()
        .flat_map(|leg| &leg.steps)
        .filter(|step| step.is_transit())
        .filter_map(|step| step.transit_details.as_ref());

    for details in transit_steps {
        if !within_fence(details, fence) {
            debug!(
                from = %details.departure_stop.name,
                to = %details.arrival_stop.name,
                "dropping transit step outside service area"
            );
            *fenced += 1;
            continue;
        }

        let departure = ClockTime::parse_provider(&details.departure_time.text)?;
        let arrival = ClockTime::parse_provider(&details.arrival_time.text)?;

        builder.push(details.departure_stop.name.as_str(), departure);
        builder.push(details.arrival_stop.name.as_str(), arrival);

        for stop in [&details.departure_stop, &details.arrival_stop] {
            if !stop_locations.iter().any(|(name, _)| *name == stop.name) {
                stop_locations.push((stop.name.clone(), stop.location));
            }
        }

        // Staying on the same line across steps is one bus.
        if let Some(label) = line_label(details)
            && labels.last() != Some(&label)
        {
            labels.push(label);
        }
    }

    let stops = builder.build()?;
    let date = route
        .legs
        .iter()
        .find_map(|leg| leg.departure_time.as_ref())
        .and_then(|t| DateTime::from_timestamp(t.value, 0))
        .map(|dt| dt.date_naive())
        .unwrap_or(fallback_date);

    Ok(CandidateTrip {
        route_label: labels.join(LABEL_SEPARATOR),
        stops,
        date,
        stop_locations,
    })
}

fn within_fence(details: &TransitDetails, fence: &GeoFence) -> bool {
    [&details.departure_stop, &details.arrival_stop]
        .iter()
        .all(|stop| fence.contains(stop.location.lat, stop.location.lng))
}

/// Line short name without the provider's bus prefix.
fn line_label(details: &TransitDetails) -> Option<String> {
    let name = details
        .line
        .short_name
        .as_deref()
        .or(details.line.name.as_deref())?
        .trim();
    let label = name.strip_prefix(LINE_PREFIX).unwrap_or(name);
    (!label.is_empty()).then(|| label.to_string())
}
