//! Great-circle distance and planar interpolation helpers.
use serde::{Deserialize, Serialize};

use crate::constants::EARTH_RADIUS_KM;
use crate::error::TrackerError;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reject points carrying NaN or infinite components.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::NonFiniteCoordinate`] naming the bad component.
    pub fn ensure_finite(self) -> Result<Self, TrackerError> {
        if !self.latitude.is_finite() {
            return Err(TrackerError::NonFiniteCoordinate {
                field: "latitude",
                value: self.latitude,
            });
        }
        if !self.longitude.is_finite() {
            return Err(TrackerError::NonFiniteCoordinate {
                field: "longitude",
                value: self.longitude,
            });
        }
        Ok(self)
    }
}

/// Haversine distance between two points in kilometres.
#[must_use]
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Wrap a longitude into `[-180, 180)`.
#[must_use]
pub fn normalize_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Signed longitude delta from `from` to `to` taking the short way round.
#[must_use]
pub fn shortest_longitude_delta(from: f64, to: f64) -> f64 {
    normalize_longitude(to - from)
}

/// Linear interpolation between two points at `t`.
///
/// Longitude follows the shortest arc so a hop across the antimeridian
/// does not sweep around the whole globe.
#[must_use]
pub fn lerp(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    let latitude = a.latitude + (b.latitude - a.latitude) * t;
    let d_lon = shortest_longitude_delta(a.longitude, b.longitude);
    let longitude = normalize_longitude(a.longitude + d_lon * t);
    GeoPoint::new(latitude, longitude)
}

/// Plain midpoint of two points, antimeridian-aware.
#[must_use]
pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    lerp(a, b, 0.5)
}
