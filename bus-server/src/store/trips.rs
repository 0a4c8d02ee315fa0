//! Trip storage.
//!
//! Holds curated and discovered trips behind a single lock. Readers get
//! `Arc` snapshots of whole trips, so they never observe a half-written
//! row; the dedup check and the insert happen under the same write guard.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::{DedupKey, Trip, TripDraft, TripId, TripKind, Vote, Votes};
use crate::text::normalize;

/// Result of [`TripStore::insert_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    /// Id of the new trip, or of the existing trip with the same dedup key.
    pub id: TripId,
    /// Whether a new row was created.
    pub inserted: bool,
}

#[derive(Debug, Default)]
struct TripTable {
    trips: BTreeMap<TripId, Arc<Trip>>,
    keys: HashMap<DedupKey, TripId>,
    next_id: u64,
}

impl TripTable {
    fn allocate_id(&mut self) -> TripId {
        self.next_id += 1;
        TripId(self.next_id)
    }

    fn remove(&mut self, id: TripId) {
        if let Some(trip) = self.trips.remove(&id) {
            self.keys.remove(&trip.dedup_key());
        }
    }
}

/// Thread-safe trip store.
///
/// Cloning is cheap and every clone shares the same table.
#[derive(Debug, Clone, Default)]
pub struct TripStore {
    inner: Arc<RwLock<TripTable>>,
}

impl TripStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enabled trips whose normalised stop text contains both fragments.
    ///
    /// `origin` and `destination` must already be normalised. Containment is
    /// checked against the whole concatenated sequence text, not entry by
    /// entry. Results come back in id order.
    pub async fn find_by_containing_both(&self, origin: &str, destination: &str) -> Vec<Arc<Trip>> {
        let guard = self.inner.read().await;
        guard
            .trips
            .values()
            .filter(|trip| !trip.disabled)
            .filter(|trip| {
                let text = trip.stops.normalized_text();
                text.contains(origin) && text.contains(destination)
            })
            .cloned()
            .collect()
    }

    /// Insert a trip unless one with the same route label, stop sequence and
    /// day type already exists.
    pub async fn insert_if_absent(&self, draft: TripDraft, now: DateTime<Utc>) -> Insertion {
        let key = draft.dedup_key();
        let mut guard = self.inner.write().await;

        if let Some(&id) = guard.keys.get(&key) {
            debug!(trip = %id, route = %key.route_label, "trip already stored");
            return Insertion {
                id,
                inserted: false,
            };
        }

        let id = guard.allocate_id();
        guard.keys.insert(key, id);
        guard.trips.insert(id, Arc::new(draft.into_trip(id, now)));
        Insertion { id, inserted: true }
    }

    /// Reset a trip's `added_at`, delaying its expiry.
    ///
    /// Returns false if the trip does not exist.
    pub async fn touch(&self, id: TripId, now: DateTime<Utc>) -> bool {
        let mut guard = self.inner.write().await;
        match guard.trips.get_mut(&id) {
            Some(trip) => {
                Arc::make_mut(trip).added_at = now;
                true
            }
            None => false,
        }
    }

    /// Remove discovered trips added at or before `now - ttl`.
    ///
    /// Curated trips are never removed. Returns the number of trips deleted.
    pub async fn delete_expired(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut guard = self.inner.write().await;
        let expired: Vec<TripId> = guard
            .trips
            .values()
            .filter(|trip| trip.is_expired(now, ttl))
            .map(|trip| trip.id)
            .collect();

        for id in &expired {
            guard.remove(*id);
        }
        expired.len()
    }

    /// Look up a trip by id.
    pub async fn get(&self, id: TripId) -> Option<Arc<Trip>> {
        let guard = self.inner.read().await;
        guard.trips.get(&id).cloned()
    }

    /// Every trip, including disabled ones, in id order.
    pub async fn all(&self) -> Vec<Arc<Trip>> {
        let guard = self.inner.read().await;
        guard.trips.values().cloned().collect()
    }

    /// Enabled curated trips in id order.
    pub async fn curated(&self) -> Vec<Arc<Trip>> {
        let guard = self.inner.read().await;
        guard
            .trips
            .values()
            .filter(|trip| trip.kind == TripKind::Curated && !trip.disabled)
            .cloned()
            .collect()
    }

    /// Curated trips whose route label contains `label`, ignoring case and accents.
    pub async fn by_label(&self, label: &str) -> Vec<Arc<Trip>> {
        let needle = normalize(label);
        self.curated()
            .await
            .into_iter()
            .filter(|trip| normalize(&trip.route_label).contains(&needle))
            .collect()
    }

    /// Record a rider vote. Returns the updated counters, or `None` for an
    /// unknown trip.
    pub async fn vote(&self, id: TripId, vote: Vote, switching: bool) -> Option<Votes> {
        let mut guard = self.inner.write().await;
        let trip = guard.trips.get_mut(&id)?;
        let trip = Arc::make_mut(trip);
        trip.votes.record(vote, switching);
        Some(trip.votes)
    }

    /// Load previously stored trips, keeping their ids.
    ///
    /// Trips whose id or dedup key is already present are skipped. Returns
    /// the number of trips loaded.
    pub async fn restore(&self, trips: impl IntoIterator<Item = Trip>) -> usize {
        let mut guard = self.inner.write().await;
        let mut loaded = 0;

        for trip in trips {
            let key = trip.dedup_key();
            if guard.trips.contains_key(&trip.id) || guard.keys.contains_key(&key) {
                debug!(trip = %trip.id, "skipping duplicate trip on restore");
                continue;
            }
            guard.next_id = guard.next_id.max(trip.id.0);
            guard.keys.insert(key, trip.id);
            guard.trips.insert(trip.id, Arc::new(trip));
            loaded += 1;
        }

        loaded
    }

    /// Number of stored trips.
    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.trips.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.trips.is_empty()
    }
}
