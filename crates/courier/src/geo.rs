//! Great-circle distance between coordinate pairs.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub lat: f64,
  pub lon: f64,
}

impl GeoPoint {
  pub fn new(lat: f64, lon: f64) -> Self {
    Self { lat, lon }
  }

  /// Finite and inside [-90, 90] x [-180, 180].
  pub fn is_valid(&self) -> bool {
    self.lat.is_finite()
      && self.lon.is_finite()
      && (-90.0..=90.0).contains(&self.lat)
      && (-180.0..=180.0).contains(&self.lon)
  }
}

/// Haversine distance in kilometers.
///
/// Assumes both points are valid; callers are expected to check
/// [`GeoPoint::is_valid`] first (see [`route_distance`]).
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
  let dlat = (b.lat - a.lat).to_radians();
  let dlon = (b.lon - a.lon).to_radians();

  let h = (dlat / 2.0).sin().powi(2)
    + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlon / 2.0).sin().powi(2);

  // Rounding can push h a hair outside [0, 1] for near-antipodal points
  let central_angle = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();
  EARTH_RADIUS_KM * central_angle
}

/// Distance between two optional points, or `None` when either is missing or out of range.
pub fn route_distance(from: Option<GeoPoint>, to: Option<GeoPoint>) -> Option<f64> {
  match (from, to) {
    (Some(a), Some(b)) if a.is_valid() && b.is_valid() => Some(distance(a, b)),
    _ => None,
  }
}
