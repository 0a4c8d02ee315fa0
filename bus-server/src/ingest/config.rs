//! Ingestion configuration.

use chrono::Duration;

use crate::directions::GeoFence;

/// Default lifetime of a discovered trip, in days.
pub const DEFAULT_TTL_DAYS: i64 = 30;

/// Configuration for [`ExternalScheduleIngestor`](super::ExternalScheduleIngestor).
#[derive(Debug, Clone, PartialEq)]
pub struct IngestConfig {
    /// How long a discovered trip lives after it was last seen.
    pub ttl_days: i64,

    /// Reset `added_at` on trips the provider returns again.
    pub refresh_existing: bool,

    /// Service area; steps leaving it are dropped.
    pub fence: GeoFence,
}

impl IngestConfig {
    /// Returns the trip lifetime as a Duration.
    pub fn ttl(&self) -> Duration {
        Duration::days(self.ttl_days)
    }

    pub fn with_ttl_days(mut self, days: i64) -> Self {
        self.ttl_days = days;
        self
    }

    pub fn with_refresh_existing(mut self, refresh: bool) -> Self {
        self.refresh_existing = refresh;
        self
    }

    pub fn with_fence(mut self, fence: GeoFence) -> Self {
        self.fence = fence;
        self
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            ttl_days: DEFAULT_TTL_DAYS,
            refresh_existing: true,
            fence: GeoFence::default(),
        }
    }
}
