//! External transit directions provider.
//!
//! The provider is only consulted when the local timetable has nothing
//! for a query. Its responses are converted into candidate trips: every
//! transit step of a route alternative contributes its stops and times,
//! steps outside the service area are dropped, and line names lose the
//! provider's `C` prefix.

mod client;
mod convert;
mod error;
mod geofence;
mod mock;
mod types;

use std::future::Future;

pub use client::{DirectionsClient, DirectionsConfig, DirectionsRequest};
pub use convert::{
    CandidateTrip, Conversion, ConversionError, LABEL_SEPARATOR, convert_response, convert_route,
};
pub use error::DirectionsError;
pub use geofence::{DEFAULT_CENTER, DEFAULT_RADIUS_KM, GeoFence};
pub use mock::MockDirectionsClient;
pub use types::{
    DirectionsResponse, LatLng, Leg, Line, Route, Step, TimeValue, TransitDetails, TransitStop,
};

#[cfg(test)]
pub(crate) use convert::fixtures;

/// Source of transit directions.
///
/// Implemented by the live client, the mock and the caching wrapper so the
/// ingestor can be exercised without network access.
pub trait DirectionsProvider: Send + Sync {
    /// Fetch directions for a query. Only `OK` responses are returned.
    fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> impl Future<Output = Result<DirectionsResponse, DirectionsError>> + Send;
}

/// The provider chosen at startup.
#[derive(Debug, Clone)]
pub enum DirectionsBackend {
    Live(DirectionsClient),
    Mock(MockDirectionsClient),
    /// External lookups are switched off.
    Disabled,
}

impl DirectionsProvider for DirectionsBackend {
    async fn directions(
        &self,
        request: &DirectionsRequest,
    ) -> Result<DirectionsResponse, DirectionsError> {
        match self {
            DirectionsBackend::Live(client) => client.directions(request).await,
            DirectionsBackend::Mock(mock) => mock.directions(request).await,
            DirectionsBackend::Disabled => Err(DirectionsError::NotConfigured(
                "external directions are disabled".to_string(),
            )),
        }
    }
}
