//! Materialising provider directions into discovered trips.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::directions::{
    CandidateTrip, DirectionsProvider, DirectionsRequest, DirectionsResponse, convert_response,
};
use crate::domain::{DayType, Stop, TripDraft};
use crate::matcher::{MatchError, MatchQuery, MatchedTrip, TripMatcher, restore_diacritics};
use crate::store::Catalog;
use crate::text::normalize;

use super::config::IngestConfig;

/// What one provider response added to the stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub trips_inserted: usize,
    /// Trips that already existed; their expiry was pushed back if enabled.
    pub trips_seen_again: usize,
    pub stops_registered: usize,
    pub fenced_steps: usize,
    pub skipped_routes: usize,
}

/// Fills the trip store from an external directions provider.
///
/// Used when the local timetable has nothing for a query. Expired
/// discovered trips are swept on every attempt.
pub struct ExternalScheduleIngestor<P> {
    provider: P,
    catalog: Catalog,
    matcher: TripMatcher,
    config: IngestConfig,
}

impl<P: DirectionsProvider> ExternalScheduleIngestor<P> {
    pub fn new(provider: P, catalog: Catalog, matcher: TripMatcher, config: IngestConfig) -> Self {
        Self {
            provider,
            catalog,
            matcher,
            config,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ask the provider for `query` on `date` and re-run the search.
    ///
    /// Provider failures are logged and give an empty list.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidQuery`] if origin or destination is blank.
    pub async fn ingest(
        &self,
        query: &MatchQuery,
        date: NaiveDate,
    ) -> Result<Vec<MatchedTrip>, MatchError> {
        self.ingest_at(query, date, Utc::now()).await
    }

    /// [`ingest`](Self::ingest) with an explicit current time.
    pub async fn ingest_at(
        &self,
        query: &MatchQuery,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<MatchedTrip>, MatchError> {
        let origin = display_name(&query.origin);
        let destination = display_name(&query.destination);
        if origin.is_empty() || destination.is_empty() {
            return Err(MatchError::InvalidQuery(
                "origin and destination are required".to_string(),
            ));
        }

        let swept = self
            .catalog
            .trips
            .delete_expired(now, self.config.ttl())
            .await;
        if swept > 0 {
            info!(count = swept, "removed expired discovered trips");
        }

        let request = self.build_request(&origin, &destination, query, date).await;

        let response = match self.provider.directions(&request).await {
            Ok(response) => response,
            Err(e) if e.is_zero_results() => {
                debug!(%origin, %destination, %date, "provider has no routes");
                return Ok(Vec::new());
            }
            Err(e) => {
                warn!(
                    %origin,
                    %destination,
                    %date,
                    status = ?e.http_status(),
                    error = %e,
                    "directions lookup failed"
                );
                return Ok(Vec::new());
            }
        };

        let report = self.ingest_response(&response, date, now).await;
        info!(
            %origin,
            %destination,
            inserted = report.trips_inserted,
            seen_again = report.trips_seen_again,
            stops = report.stops_registered,
            fenced = report.fenced_steps,
            "ingested directions"
        );

        self.matcher.find_trips(query).await
    }

    /// Store the trips and stops of a provider response.
    ///
    /// Trips already stored under the same route label, stop sequence and
    /// day type are not duplicated.
    pub async fn ingest_response(
        &self,
        response: &DirectionsResponse,
        fallback_date: NaiveDate,
        now: DateTime<Utc>,
    ) -> IngestReport {
        let conversion = convert_response(response, &self.config.fence, fallback_date);
        let mut report = IngestReport {
            fenced_steps: conversion.fenced_steps,
            skipped_routes: conversion.skipped_routes,
            ..IngestReport::default()
        };

        let holidays = join_all(
            conversion
                .trips
                .iter()
                .map(|trip| self.catalog.holidays.is_holiday(trip.date)),
        )
        .await;

        for (candidate, is_holiday) in conversion.trips.into_iter().zip(holidays) {
            report.stops_registered += self.register_stops(&candidate).await;

            let day_type = DayType::classify(candidate.date, is_holiday);
            let draft = TripDraft::discovered(candidate.route_label, candidate.stops, day_type);
            let insertion = self.catalog.trips.insert_if_absent(draft, now).await;

            if insertion.inserted {
                report.trips_inserted += 1;
            } else {
                report.trips_seen_again += 1;
                if self.config.refresh_existing {
                    self.catalog.trips.touch(insertion.id, now).await;
                }
            }
        }

        report
    }

    async fn register_stops(&self, candidate: &CandidateTrip) -> usize {
        let mut created = 0;
        for (name, location) in &candidate.stop_locations {
            let (_, new) = self
                .catalog
                .stops
                .register_if_absent(name, location.lat, location.lng)
                .await;
            if new {
                created += 1;
            }
        }
        created
    }

    /// Query known stops by coordinates, anything else by name.
    async fn build_request(
        &self,
        origin: &str,
        destination: &str,
        query: &MatchQuery,
        date: NaiveDate,
    ) -> DirectionsRequest {
        let time = query
            .min_start
            .map(|t| t.to_naive())
            .unwrap_or(NaiveTime::MIN);
        let departure = date.and_time(time).and_utc();

        let mut request = DirectionsRequest::new(origin, destination, departure);
        if let Some(stop) = self.known_stop(origin).await {
            request = request.with_origin_location(stop.lat_lng());
        }
        if let Some(stop) = self.known_stop(destination).await {
            request = request.with_destination_location(stop.lat_lng());
        }
        request
    }

    async fn known_stop(&self, name: &str) -> Option<Stop> {
        match self.catalog.stops.find_by_name(name).await {
            Some(stop) => Some(stop),
            None => self.catalog.stops.find_by_normalized(&normalize(name)).await,
        }
    }
}

/// The name to send upstream: trimmed, with lost cedillas restored.
fn display_name(raw: &str) -> String {
    let normalized = normalize(raw);
    restore_diacritics(&normalized)
        .map(str::to_string)
        .unwrap_or_else(|| raw.trim().to_string())
}
