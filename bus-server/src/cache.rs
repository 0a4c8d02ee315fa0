//! Caching layer for directions responses.
//!
//! Riders hammering the same unmatched query would otherwise each trigger a
//! paid provider call. Successful responses are kept for a short TTL, keyed
//! by the queried places and the departure time rounded down to a bucket.
//! Failures are never cached.
//!
//! Time bucketing (5-minute buckets) bounds cache cardinality while ensuring
//! reasonable freshness.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Timelike};
use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::directions::{DirectionsError, DirectionsProvider, DirectionsRequest, DirectionsResponse};
use crate::text::normalize;

/// Cache key: (origin query, destination query, date, time bucket).
/// Time bucket is minutes from midnight divided by the bucket size.
type DirectionsKey = (String, String, NaiveDate, u16);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,

    /// Time bucket size in minutes.
    pub bucket_mins: u16,
}

impl CacheConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_bucket_mins(mut self, mins: u16) -> Self {
        self.bucket_mins = mins.max(1);
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_capacity: 1000,
            bucket_mins: 5,
        }
    }
}

/// A directions provider with a response cache in front.
pub struct CachedDirections<P> {
    provider: P,
    responses: MokaCache<DirectionsKey, Arc<DirectionsResponse>>,
    bucket_mins: u16,
}

impl<P: DirectionsProvider> CachedDirections<P> {
    /// Wrap `provider` with a cache.
    pub fn new(provider: P, config: &CacheConfig) -> Self {
        let responses = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            provider,
            responses,
            bucket_mins: config.bucket_mins.max(1),
        }
    }

    fn key(&self, request: &DirectionsRequest) -> DirectionsKey {
        let departure = request.departure;
        let mins = (departure.hour() * 60 + departure.minute()) as u16;
        (
            normalize(&request.origin_query),
            normalize(&request.destination_query),
            departure.date_naive(),
            mins / self.bucket_mins,
        )
    }

    /// Access the wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get cache statistics (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.responses.entry_count()
    }

    /// Invalidate all cached entries.
    pub fn invalidate_all(&self) {
        self.responses.invalidate_all();
    }
}

impl<P: DirectionsProvider> DirectionsProvider for CachedDirections<P> {
    async fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        let key = self.key(request);

        if let Some(cached) = self.responses.get(&key).await {
            debug!(origin = %key.0, destination = %key.1, "directions cache hit");
            return Ok((*cached).clone());
        }

        let response = self.provider.directions(request).await?;
        self.responses
            .insert(key, Arc::new(response.clone()))
            .await;

        Ok(response)
    }
}
