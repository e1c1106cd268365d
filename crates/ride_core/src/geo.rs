//! Geographic math: haversine distance, bearings, point projection, and the
//! interpolation helpers used to animate vehicle motion.
//!
//! All functions are pure and never fail for in-range inputs; callers are
//! expected to validate at the boundary before reaching these formulas.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS-84 coordinate pair in degrees. Immutable value type, copied freely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two points (haversine).
///
/// Symmetric, never negative, and zero for identical points.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lon1) = (a.latitude.to_radians(), a.longitude.to_radians());
    let (lat2, lon2) = (b.latitude.to_radians(), b.longitude.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Initial compass bearing from `a` toward `b`, normalized to `[0, 360)`.
///
/// The bearing from a point to itself is degenerate; this returns 0 for it,
/// but callers must not rely on that value.
pub fn initial_bearing_deg(a: GeoPoint, b: GeoPoint) -> f32 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();

    let bearing = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can land an f32 rounding hair on exactly 360.0; fold it back.
    (bearing as f32) % 360.0
}

/// Projects a point `distance_km` along `bearing_deg` from `origin` using
/// spherical trigonometry.
pub fn destination_point(origin: GeoPoint, distance_km: f64, bearing_deg: f64) -> GeoPoint {
    let angular = distance_km / EARTH_RADIUS_KM;
    let bearing = bearing_deg.to_radians();
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
}

/// Angular sector for spawn bearings, degrees clockwise from north.
///
/// The default matches the sector the driver spawn uses for its start
/// points; it is cosmetic and can be widened to a full circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingSector {
    pub min_deg: f64,
    pub max_deg: f64,
}

impl Default for BearingSector {
    fn default() -> Self {
        Self {
            min_deg: 45.0,
            max_deg: 90.0,
        }
    }
}

/// Picks a random point in the annulus between `min_distance_m` and
/// `max_distance_m` meters from `origin`, with the bearing drawn uniformly
/// from `sector`.
pub fn random_point_in_annulus<R: Rng + ?Sized>(
    rng: &mut R,
    origin: GeoPoint,
    min_distance_m: f64,
    max_distance_m: f64,
    sector: BearingSector,
) -> GeoPoint {
    let distance_m = rng.gen_range(min_distance_m..=max_distance_m);
    let bearing_deg = rng.gen_range(sector.min_deg..=sector.max_deg);
    destination_point(origin, distance_m / 1000.0, bearing_deg)
}

/// Interpolates two angles in degrees along the shortest rotational path,
/// wrapping at 0/360 (350° → 10° passes through 0°, not 360°).
pub fn lerp_angle_deg(start: f32, end: f32, t: f32) -> f32 {
    let delta = (((end - start) % 360.0) + 540.0) % 360.0 - 180.0;
    (start + delta * t + 360.0) % 360.0
}

/// Cubic ease-in-out: gradual start, fast middle, gradual stop.
///
/// `ease(0) == 0`, `ease(1) == 1`, monotonic non-decreasing on `[0, 1]`.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}
