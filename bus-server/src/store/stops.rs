//! Stop catalog.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::{Stop, StopId, StopSource};

#[derive(Debug, Default)]
struct StopTable {
    stops: BTreeMap<StopId, Stop>,
    next_id: u64,
}

impl StopTable {
    fn by_name(&self, name: &str) -> Option<&Stop> {
        self.stops.values().find(|s| s.name() == name)
    }

    fn add(&mut self, name: &str, latitude: f64, longitude: f64, source: StopSource) -> StopId {
        self.next_id += 1;
        let id = StopId(self.next_id);
        self.stops
            .insert(id, Stop::new(id, name, latitude, longitude, source));
        id
    }
}

/// Thread-safe catalog of known stops, keyed by exact display name.
#[derive(Debug, Clone, Default)]
pub struct StopCatalog {
    inner: Arc<RwLock<StopTable>>,
}

impl StopCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a curated stop, or return the existing id if the name is taken.
    pub async fn insert_curated(&self, name: &str, latitude: f64, longitude: f64) -> StopId {
        let mut guard = self.inner.write().await;
        match guard.by_name(name) {
            Some(stop) => stop.id,
            None => guard.add(name, latitude, longitude, StopSource::Curated),
        }
    }

    /// Register a stop seen in a directions response.
    ///
    /// Names are compared exactly, so "Lagoa" and "lagoa" are two stops.
    /// Returns the stop id and whether it was newly created.
    pub async fn register_if_absent(
        &self,
        name: &str,
        latitude: f64,
        longitude: f64,
    ) -> (StopId, bool) {
        let mut guard = self.inner.write().await;
        if let Some(stop) = guard.by_name(name) {
            return (stop.id, false);
        }
        let id = guard.add(name, latitude, longitude, StopSource::Discovered);
        (id, true)
    }

    /// Look up a stop by its exact display name.
    pub async fn find_by_name(&self, name: &str) -> Option<Stop> {
        let guard = self.inner.read().await;
        guard.by_name(name).cloned()
    }

    /// First stop whose normalised name equals `normalized`.
    pub async fn find_by_normalized(&self, normalized: &str) -> Option<Stop> {
        let guard = self.inner.read().await;
        guard
            .stops
            .values()
            .find(|s| s.normalized_name() == normalized)
            .cloned()
    }

    /// Display names in id order.
    pub async fn names(&self) -> Vec<String> {
        let guard = self.inner.read().await;
        guard.stops.values().map(|s| s.name().to_string()).collect()
    }

    /// Every stop in id order.
    pub async fn all(&self) -> Vec<Stop> {
        let guard = self.inner.read().await;
        guard.stops.values().cloned().collect()
    }

    /// Load previously stored stops, keeping their ids.
    ///
    /// Stops whose id or name is already present are skipped.
    pub async fn restore(&self, stops: impl IntoIterator<Item = Stop>) -> usize {
        let mut guard = self.inner.write().await;
        let mut loaded = 0;
        for stop in stops {
            if guard.stops.contains_key(&stop.id) || guard.by_name(stop.name()).is_some() {
                continue;
            }
            guard.next_id = guard.next_id.max(stop.id.0);
            guard.stops.insert(stop.id, stop);
            loaded += 1;
        }
        loaded
    }

    pub async fn len(&self) -> usize {
        let guard = self.inner.read().await;
        guard.stops.len()
    }

    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.stops.is_empty()
    }
}
