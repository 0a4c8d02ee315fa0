//! Trip search.
//!
//! Finds stored trips that pass through an origin and then a destination,
//! optionally restricted to a day type and an earliest departure.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::{ClockTime, DayType, StopSequence, Trip, TripId, TripKind};
use crate::store::Catalog;
use crate::text::{StopResolver, normalize};

use super::config::MatcherConfig;
use super::exceptions::restore_diacritics;

/// Error from trip search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Origin or destination missing
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

/// A trip search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    pub origin: String,
    pub destination: String,
    pub day_type: Option<DayType>,
    /// Earliest accepted departure from the trip's first stop.
    pub min_start: Option<ClockTime>,
    /// Return the whole stop sequence. Trips are currently always returned
    /// in full.
    pub full: bool,
}

impl MatchQuery {
    /// Search every day and time between two stops.
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            day_type: None,
            min_start: None,
            full: true,
        }
    }

    pub fn with_day_type(mut self, day_type: DayType) -> Self {
        self.day_type = Some(day_type);
        self
    }

    pub fn with_min_start(mut self, min_start: ClockTime) -> Self {
        self.min_start = Some(min_start);
        self
    }

    pub fn with_full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }
}

/// A trip matching a query, with the times at the queried stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedTrip {
    pub trip_id: TripId,
    pub kind: TripKind,
    pub route_label: String,
    /// Origin as asked for, with known lost diacritics restored.
    pub origin: String,
    pub destination: String,
    /// Time at the origin stop.
    pub start_time: ClockTime,
    /// Time at the destination stop.
    pub end_time: ClockTime,
    pub stops: StopSequence,
    pub day_type: DayType,
    pub likes_percent: u8,
    pub dislikes_percent: u8,
    pub information: Option<String>,
}

/// Normalised search terms and their display forms.
#[derive(Debug, Clone)]
struct Terms {
    origin: String,
    destination: String,
}

/// Query engine over the trip store.
#[derive(Debug, Clone)]
pub struct TripMatcher {
    catalog: Catalog,
    resolver: StopResolver,
    config: MatcherConfig,
}

impl TripMatcher {
    pub fn new(catalog: Catalog, config: MatcherConfig) -> Self {
        Self {
            catalog,
            resolver: StopResolver::new(config.resolver.clone()),
            config,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Find trips from `query.origin` to `query.destination`.
    ///
    /// Results are ordered by the time at the origin stop, then by trip id.
    /// An empty list is a normal result.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidQuery`] if origin or destination is blank.
    pub async fn find_trips(&self, query: &MatchQuery) -> Result<Vec<MatchedTrip>, MatchError> {
        let mut terms = Terms {
            origin: normalize(&query.origin),
            destination: normalize(&query.destination),
        };
        if terms.origin.is_empty() {
            return Err(MatchError::InvalidQuery("origin is required".to_string()));
        }
        if terms.destination.is_empty() {
            return Err(MatchError::InvalidQuery(
                "destination is required".to_string(),
            ));
        }

        let mut candidates = self
            .catalog
            .trips
            .find_by_containing_both(&terms.origin, &terms.destination)
            .await;

        let mut origin_display = display_name(&query.origin, &terms.origin);
        let mut destination_display = display_name(&query.destination, &terms.destination);

        // Without a floor every query would snap to some stop and never
        // reach external discovery.
        if candidates.is_empty()
            && self.config.resolve_unmatched
            && self.config.resolver.similarity_floor > 0.0
            && let Some((resolved, names)) = self.resolve_terms(&terms).await
        {
            debug!(
                origin = %resolved.origin,
                destination = %resolved.destination,
                "retrying search with resolved stop names"
            );
            candidates = self
                .catalog
                .trips
                .find_by_containing_both(&resolved.origin, &resolved.destination)
                .await;
            terms = resolved;
            (origin_display, destination_display) = names;
        }

        let mut matched: Vec<MatchedTrip> = candidates
            .into_iter()
            .filter(|trip| runs_in_order(trip, &terms))
            .filter(|trip| query.day_type.is_none_or(|d| trip.day_type == d))
            .filter(|trip| {
                query
                    .min_start
                    .is_none_or(|min| trip.stops.first().time >= min)
            })
            .map(|trip| {
                project(
                    &trip,
                    &terms,
                    origin_display.clone(),
                    destination_display.clone(),
                )
            })
            .collect();

        matched.sort_by_key(|m| (m.start_time, m.trip_id));
        Ok(matched)
    }

    /// Resolve both terms to known stop names.
    ///
    /// Returns the normalised terms and the stop names they resolved to, or
    /// `None` unless both resolve and at least one changes.
    async fn resolve_terms(&self, terms: &Terms) -> Option<(Terms, (String, String))> {
        let names = self.catalog.stops.names().await;
        let origin = self
            .resolver
            .resolve(&terms.origin, names.iter().map(String::as_str))?;
        let destination = self
            .resolver
            .resolve(&terms.destination, names.iter().map(String::as_str))?;

        let resolved = Terms {
            origin: normalize(&origin.name),
            destination: normalize(&destination.name),
        };
        if resolved.origin == terms.origin && resolved.destination == terms.destination {
            return None;
        }
        Some((resolved, (origin.name, destination.name)))
    }
}

/// The origin must appear before the destination in the trip text.
///
/// Equal offsets mean one term is a prefix of the other and both land on
/// the same stop, so that trip does not connect them.
fn runs_in_order(trip: &Trip, terms: &Terms) -> bool {
    let text = trip.stops.normalized_text();
    match (text.find(&terms.origin), text.find(&terms.destination)) {
        (Some(o), Some(d)) => o < d,
        _ => false,
    }
}

fn display_name(raw: &str, normalized: &str) -> String {
    restore_diacritics(normalized)
        .map(str::to_string)
        .unwrap_or_else(|| raw.trim().to_string())
}

fn project(trip: &Arc<Trip>, terms: &Terms, origin: String, destination: String) -> MatchedTrip {
    let start_time = trip
        .stops
        .find_stop(&terms.origin)
        .unwrap_or(trip.stops.first())
        .time;
    let end_time = trip
        .stops
        .find_stop(&terms.destination)
        .unwrap_or(trip.stops.last())
        .time;

    MatchedTrip {
        trip_id: trip.id,
        kind: trip.kind,
        route_label: trip.route_label.clone(),
        origin,
        destination,
        start_time,
        end_time,
        stops: trip.stops.clone(),
        day_type: trip.day_type,
        likes_percent: trip.votes.likes_percent(),
        dislikes_percent: trip.votes.dislikes_percent(),
        information: trip.information.clone(),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::TripDraft;
    use chrono::Utc;
    use proptest::prelude::*;

    const STOPS: &[&str] = &[
        "Ponta Delgada",
        "Lagoa",
        "Ribeira Grande",
        "Furnas",
        "Nordeste",
        "Sete Cidades",
    ];

    /// A trip over a shuffled subset of stops with increasing times.
    fn trip_stops() -> impl Strategy<Value = Vec<(&'static str, String)>> {
        (Just(STOPS.to_vec()).prop_shuffle(), 2usize..=STOPS.len()).prop_map(|(stops, n)| {
            stops
                .into_iter()
                .take(n)
                .enumerate()
                .map(|(i, s)| (s, format!("{:02}h{:02}", 6 + i, i * 7)))
                .collect()
        })
    }

    proptest! {
        /// Every returned trip visits the origin before the destination.
        #[test]
        fn origin_precedes_destination(
            trips in prop::collection::vec(trip_stops(), 1..6),
            o in 0..STOPS.len(),
            d in 0..STOPS.len(),
        ) {
            prop_assume!(o != d);
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let (origin, destination) = (STOPS[o], STOPS[d]);

            let found = rt.block_on(async {
                let catalog = Catalog::new();
                for (i, pairs) in trips.iter().enumerate() {
                    let seq = StopSequence::parse(
                        pairs.iter().map(|(s, t)| (*s, t.as_str())),
                    )
                    .unwrap();
                    catalog
                        .trips
                        .insert_if_absent(
                            TripDraft::curated(i.to_string(), seq, DayType::Weekday),
                            Utc::now(),
                        )
                        .await;
                }
                TripMatcher::new(catalog, MatcherConfig::default())
                    .find_trips(&MatchQuery::new(origin, destination))
                    .await
                    .unwrap()
            });

            let (on, dn) = (normalize(origin), normalize(destination));
            for m in &found {
                let text = m.stops.normalized_text();
                let oi = text.find(&on).unwrap();
                let di = text.find(&dn).unwrap();
                prop_assert!(oi < di);
                prop_assert!(m.start_time < m.end_time);
            }

            // Sorted by origin time.
            for pair in found.windows(2) {
                prop_assert!(pair[0].start_time <= pair[1].start_time);
            }
        }
    }
}
