//! In-memory repositories for stops, trips and holidays.
//!
//! Every store is a cloneable handle over shared state. A [`Catalog`]
//! bundles them so they can be built once at startup and passed to the
//! matcher, the ingestor and the web layer.

mod error;
mod holidays;
mod snapshot;
mod stops;
mod trips;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

pub use error::StoreError;
pub use holidays::HolidayCalendar;
pub use snapshot::{Snapshot, SnapshotFile};
pub use stops::StopCatalog;
pub use trips::{Insertion, TripStore};

use crate::text::Group;

/// All shared stores.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub trips: TripStore,
    pub stops: StopCatalog,
    pub holidays: HolidayCalendar,
    groups: Arc<RwLock<Vec<Group>>>,
}

/// Counts from [`Catalog::restore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub stops: usize,
    pub trips: usize,
    pub holidays: usize,
    pub groups: usize,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop groups in their stored order.
    pub async fn groups(&self) -> Vec<Group> {
        let guard = self.groups.read().await;
        guard.clone()
    }

    /// Replace the stop groups.
    pub async fn set_groups(&self, groups: Vec<Group>) {
        let mut guard = self.groups.write().await;
        *guard = groups;
    }

    /// Copy the current contents of every store.
    pub async fn snapshot(&self) -> Snapshot {
        Snapshot {
            saved_at_secs: 0,
            stops: self.stops.all().await,
            trips: self
                .trips
                .all()
                .await
                .into_iter()
                .map(|trip| (*trip).clone())
                .collect(),
            holidays: self.holidays.all().await,
            groups: self.groups().await,
        }
    }

    /// Load a snapshot into the stores, keeping whatever is already there.
    pub async fn restore(&self, snapshot: Snapshot) -> RestoreReport {
        let stops = self.stops.restore(snapshot.stops).await;
        let trips = self.trips.restore(snapshot.trips).await;

        let mut holidays = 0;
        for date in snapshot.holidays {
            if self.holidays.insert(date).await {
                holidays += 1;
            }
        }

        let groups = snapshot.groups.len();
        if groups > 0 {
            self.set_groups(snapshot.groups).await;
        }

        let report = RestoreReport {
            stops,
            trips,
            holidays,
            groups,
        };
        info!(
            stops = report.stops,
            trips = report.trips,
            holidays = report.holidays,
            groups = report.groups,
            "restored catalog"
        );
        report
    }
}
