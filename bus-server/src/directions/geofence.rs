//! Service-area check for provider stops.

use geo::{Distance, Haversine, Point};

/// Reference point of the service area (São Miguel).
pub const DEFAULT_CENTER: (f64, f64) = (37.782213, -25.499806);

/// Radius of the service area in kilometres.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// A circular service area on the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoFence {
    /// Centre as (latitude, longitude).
    pub center: (f64, f64),
    pub radius_km: f64,
}

impl GeoFence {
    pub fn new(latitude: f64, longitude: f64, radius_km: f64) -> Self {
        Self {
            center: (latitude, longitude),
            radius_km,
        }
    }

    /// Great-circle distance in kilometres from the centre.
    pub fn distance_km(&self, latitude: f64, longitude: f64) -> f64 {
        // geo points are (x, y) = (longitude, latitude).
        let center = Point::new(self.center.1, self.center.0);
        let point = Point::new(longitude, latitude);
        Haversine.distance(center, point) / 1000.0
    }

    /// Whether a coordinate lies within the radius (boundary included).
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.distance_km(latitude, longitude) <= self.radius_km
    }
}

impl Default for GeoFence {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1, DEFAULT_RADIUS_KM)
    }
}
