//! Schedule queries: local search with external discovery behind a flag.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::cache::CachedDirections;
use crate::directions::{DirectionsBackend, DirectionsProvider};
use crate::domain::{ClockTime, DayType, Stop, TripId, Vote, Votes};
use crate::ingest::{ExternalScheduleIngestor, IngestConfig};
use crate::matcher::{MatchError, MatchQuery, MatchedTrip, MatcherConfig, TripMatcher};
use crate::store::Catalog;

/// A curated route in the offline export.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedRoute {
    pub id: TripId,
    pub route: String,
    pub stops: Vec<String>,
    pub times: Vec<ClockTime>,
    pub day_type: DayType,
    pub information: Option<String>,
}

/// Everything an offline client needs to answer queries itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadExport {
    pub routes: Vec<LoadedRoute>,
    pub holidays: Vec<NaiveDate>,
}

/// Vote counters after a like or dislike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteResult {
    pub likes: u32,
    pub dislikes: u32,
    pub likes_percent: u8,
    pub dislikes_percent: u8,
}

impl From<Votes> for VoteResult {
    fn from(votes: Votes) -> Self {
        Self {
            likes: votes.likes,
            dislikes: votes.dislikes,
            likes_percent: votes.likes_percent(),
            dislikes_percent: votes.dislikes_percent(),
        }
    }
}

/// Entry point for the web layer.
///
/// Searches the local timetable first. When nothing matches and external
/// lookups are enabled, the provider is consulted and the search repeated.
pub struct ScheduleService<P = CachedDirections<DirectionsBackend>> {
    catalog: Catalog,
    matcher: TripMatcher,
    ingestor: ExternalScheduleIngestor<P>,
    external_enabled: bool,
}

impl<P: DirectionsProvider> ScheduleService<P> {
    pub fn new(
        catalog: Catalog,
        matcher_config: MatcherConfig,
        provider: P,
        ingest_config: IngestConfig,
    ) -> Self {
        let matcher = TripMatcher::new(catalog.clone(), matcher_config);
        let ingestor =
            ExternalScheduleIngestor::new(provider, catalog.clone(), matcher.clone(), ingest_config);
        Self {
            catalog,
            matcher,
            ingestor,
            external_enabled: false,
        }
    }

    /// Allow calls to the external provider on a local miss.
    pub fn with_external_lookups(mut self, enabled: bool) -> Self {
        self.external_enabled = enabled;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn external_enabled(&self) -> bool {
        self.external_enabled
    }

    /// Find trips, restricted to those running on `date` if one is given.
    ///
    /// With a date the day type comes from the date and the holiday
    /// calendar and overrides any day type already set on `query`. Without
    /// one, external discovery asks for today.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidQuery`] if origin or destination is blank.
    pub async fn find_trips(
        &self,
        query: MatchQuery,
        date: Option<NaiveDate>,
    ) -> Result<Vec<MatchedTrip>, MatchError> {
        let query = match date {
            Some(date) => {
                let is_holiday = self.catalog.holidays.is_holiday(date).await;
                query.with_day_type(DayType::classify(date, is_holiday))
            }
            None => query,
        };

        let found = self.matcher.find_trips(&query).await?;
        if !found.is_empty() || !self.external_enabled {
            return Ok(found);
        }

        let date = date.unwrap_or_else(|| Local::now().date_naive());
        debug!(
            origin = %query.origin,
            destination = %query.destination,
            %date,
            "no local trips, asking provider"
        );
        self.ingestor.ingest(&query, date).await
    }

    /// Curated routes whose label contains `label`.
    pub async fn routes_by_label(&self, label: &str) -> Vec<LoadedRoute> {
        self.catalog
            .trips
            .by_label(label)
            .await
            .iter()
            .map(|trip| LoadedRoute {
                id: trip.id,
                route: trip.route_label.clone(),
                stops: trip.stops.stop_names().map(str::to_string).collect(),
                times: trip.stops.entries().iter().map(|e| e.time).collect(),
                day_type: trip.day_type,
                information: trip.information.clone(),
            })
            .collect()
    }

    /// Every enabled curated route plus the holiday list.
    pub async fn load_routes(&self) -> LoadExport {
        let routes = self.routes_by_label("").await;
        let holidays = self.catalog.holidays.all().await;
        LoadExport { routes, holidays }
    }

    /// All known stops, curated and discovered.
    pub async fn stops(&self) -> Vec<Stop> {
        self.catalog.stops.all().await
    }

    /// Record a vote. `None` if the trip does not exist.
    pub async fn vote(&self, id: TripId, vote: Vote, switching: bool) -> Option<VoteResult> {
        self.catalog
            .trips
            .vote(id, vote, switching)
            .await
            .map(VoteResult::from)
    }
}
