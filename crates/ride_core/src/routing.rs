//! Pluggable route backends: trait abstraction for the routing collaborator.
//!
//! The engine consumes resolved routes; it never invents one. A backend
//! answers with a [`RouteInfo`] or `None` for "unavailable", and the caller
//! treats `None` as a hard stop.
//!
//! Backends, selectable via [`RouteProviderKind`]:
//!
//! - **`DirectRouteProvider`**: synthesizes evenly spaced waypoints along
//!   the initial bearing. Zero dependencies, always available.
//! - **`GoogleDirectionsProvider`** (feature `google`): calls a
//!   Directions-style HTTP endpoint and decodes the overview polyline.
//! - **`PrecomputedRouteProvider`** (feature `precomputed`): serves canned
//!   routes from an in-memory or on-disk table.

use serde::{Deserialize, Serialize};

use crate::geo::{self, GeoPoint};

pub mod polyline;

#[cfg(feature = "google")]
pub mod google;

#[cfg(feature = "precomputed")]
pub mod precomputed;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Average city speed assumed when a backend has no measured duration.
pub const AVERAGE_SPEED_KMH: f64 = 40.0;

/// Estimated travel time in minutes at [`AVERAGE_SPEED_KMH`].
pub fn estimate_duration_minutes(distance_km: f64) -> f64 {
    distance_km / AVERAGE_SPEED_KMH * 60.0
}

/// Result of a route query between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    /// Road distance in kilometres.
    pub distance_km: f64,
    /// Travel time in minutes.
    pub duration_minutes: f64,
    /// Ordered waypoints from origin to destination, inclusive.
    pub waypoints: Vec<GeoPoint>,
}

/// Which routing backend to use. Serializes into run configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum RouteProviderKind {
    /// Straight-line synthesis, zero external dependencies.
    #[default]
    Direct,
    /// Directions-style HTTP endpoint (e.g. `"https://maps.googleapis.com/maps/api"`).
    #[cfg(feature = "google")]
    Google { endpoint: String, api_key: String },
    /// Pre-computed route table loaded from a binary file at startup.
    #[cfg(feature = "precomputed")]
    Precomputed { path: String },
}

/// Trait for routing backends. Implementations must be `Send + Sync` so a
/// provider can be shared with the simulation worker.
pub trait RouteProvider: Send + Sync {
    /// Compute a route between two points. Returns `None` if no route exists.
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Option<RouteInfo>;
}

impl<P: RouteProvider + ?Sized> RouteProvider for std::sync::Arc<P> {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Option<RouteInfo> {
        (**self).route(from, to)
    }
}

/// Cache/table key for `f64` endpoints: microdegree quantization keeps the
/// key hashable without losing meaningful precision (~0.1 m).
pub(crate) fn quantized(point: GeoPoint) -> (i64, i64) {
    (
        (point.latitude * 1e6).round() as i64,
        (point.longitude * 1e6).round() as i64,
    )
}

// ---------------------------------------------------------------------------
// Direct provider (always available)
// ---------------------------------------------------------------------------

/// Synthesizes a route by projecting evenly spaced waypoints along the
/// initial bearing from origin to destination, with the duration estimated
/// at [`AVERAGE_SPEED_KMH`].
#[derive(Debug, Clone)]
pub struct DirectRouteProvider {
    /// Waypoints inserted between the endpoints.
    pub intermediate_points: usize,
}

impl Default for DirectRouteProvider {
    fn default() -> Self {
        Self {
            intermediate_points: 8,
        }
    }
}

impl DirectRouteProvider {
    pub fn new(intermediate_points: usize) -> Self {
        Self {
            intermediate_points,
        }
    }
}

impl RouteProvider for DirectRouteProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Option<RouteInfo> {
        let distance_km = geo::distance_km(from, to);
        let bearing = f64::from(geo::initial_bearing_deg(from, to));

        let mut waypoints = Vec::with_capacity(self.intermediate_points + 2);
        waypoints.push(from);
        for step in 1..=self.intermediate_points {
            let fraction = step as f64 / (self.intermediate_points + 1) as f64;
            waypoints.push(geo::destination_point(from, distance_km * fraction, bearing));
        }
        waypoints.push(to);

        Some(RouteInfo {
            distance_km,
            duration_minutes: estimate_duration_minutes(distance_km),
            waypoints,
        })
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// Cache key is the quantized `(from, to)` pair (directional). On cache
/// miss the inner provider is queried; on inner failure the optional
/// fallback ([`DirectRouteProvider`]) is tried before returning `None`.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<((i64, i64), (i64, i64)), RouteInfo>>,
    fallback_to_direct: bool,
}

impl CachedRouteProvider {
    /// Create a caching wrapper with the given capacity.
    ///
    /// If `fallback_to_direct` is true, cache misses that also fail in the
    /// inner provider are retried with [`DirectRouteProvider`].
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize, fallback_to_direct: bool) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).expect("cache capacity must be > 0"),
            )),
            fallback_to_direct,
        }
    }

    fn query_inner(&self, from: GeoPoint, to: GeoPoint) -> Option<RouteInfo> {
        self.inner.route(from, to).or_else(|| {
            if self.fallback_to_direct {
                DirectRouteProvider::default().route(from, to)
            } else {
                None
            }
        })
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Option<RouteInfo> {
        let key = (quantized(from), quantized(to));

        {
            let mut cache = match self.cache.lock() {
                Ok(guard) => guard,
                // Mutex poisoned: compute without the cache.
                Err(_) => return self.query_inner(from, to),
            };
            if let Some(cached) = cache.get(&key) {
                return Some(cached.clone());
            }
        }

        let result = self.query_inner(from, to);

        if let Some(ref route) = result {
            if let Ok(mut cache) = self.cache.lock() {
                cache.put(key, route.clone());
            }
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Factory: build a provider from RouteProviderKind
// ---------------------------------------------------------------------------

/// Default route cache capacity for remote/table providers.
#[cfg(any(feature = "google", feature = "precomputed"))]
const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 20_000;

/// Construct a boxed [`RouteProvider`] from a [`RouteProviderKind`].
///
/// - `Direct` is returned without caching (it is already cheap).
/// - `Google` and `Precomputed` providers are wrapped in a
///   [`CachedRouteProvider`] with direct fallback on failure.
pub fn build_route_provider(kind: &RouteProviderKind) -> Box<dyn RouteProvider> {
    match kind {
        RouteProviderKind::Direct => Box::new(DirectRouteProvider::default()),

        #[cfg(feature = "google")]
        RouteProviderKind::Google { endpoint, api_key } => {
            let inner = Box::new(google::GoogleDirectionsProvider::new(endpoint, api_key));
            Box::new(CachedRouteProvider::new(
                inner,
                DEFAULT_ROUTE_CACHE_CAPACITY,
                true,
            ))
        }

        #[cfg(feature = "precomputed")]
        RouteProviderKind::Precomputed { path } => {
            match precomputed::PrecomputedRouteProvider::from_file(path) {
                Ok(provider) => Box::new(CachedRouteProvider::new(
                    Box::new(provider),
                    DEFAULT_ROUTE_CACHE_CAPACITY,
                    true,
                )),
                Err(error) => {
                    tracing::warn!(
                        path = %path,
                        %error,
                        "failed to load pre-computed route table; falling back to direct routing"
                    );
                    Box::new(DirectRouteProvider::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup() -> GeoPoint {
        GeoPoint::new(13.0827, 80.2707)
    }

    fn drop_point() -> GeoPoint {
        GeoPoint::new(12.9941, 80.1808)
    }

    #[test]
    fn direct_provider_spans_the_endpoints() {
        let provider = DirectRouteProvider::default();
        let route = provider.route(pickup(), drop_point()).expect("route");

        assert_eq!(route.waypoints.len(), 10);
        assert_eq!(route.waypoints[0], pickup());
        assert_eq!(*route.waypoints.last().expect("last"), drop_point());
        assert!(route.distance_km > 0.0);
        assert!(route.duration_minutes > 0.0);
    }

    #[test]
    fn direct_provider_waypoints_advance_monotonically() {
        let provider = DirectRouteProvider::new(4);
        let route = provider.route(pickup(), drop_point()).expect("route");

        let mut covered = 0.0;
        for pair in route.waypoints.windows(2) {
            let step = geo::distance_km(pair[0], pair[1]);
            assert!(step > 0.0);
            covered += step;
        }
        // The synthesized path tracks the as-the-crow-flies distance closely.
        assert!((covered - route.distance_km).abs() < 0.1);
    }

    #[test]
    fn direct_provider_same_point_returns_some() {
        let provider = DirectRouteProvider::default();
        let route = provider.route(pickup(), pickup()).expect("route");
        assert_eq!(route.distance_km, 0.0);
    }

    #[test]
    fn duration_estimate_uses_the_average_city_speed() {
        // 20 km at 40 km/h is half an hour.
        assert!((estimate_duration_minutes(20.0) - 30.0).abs() < 1e-9);
        assert_eq!(estimate_duration_minutes(0.0), 0.0);
    }

    #[test]
    fn route_provider_kind_default_is_direct() {
        assert_eq!(RouteProviderKind::default(), RouteProviderKind::Direct);
    }

    #[test]
    fn build_route_provider_direct() {
        let provider = build_route_provider(&RouteProviderKind::Direct);
        assert!(provider.route(pickup(), drop_point()).is_some());
    }

    #[test]
    fn quantization_distinguishes_close_but_distinct_points() {
        let a = quantized(GeoPoint::new(13.082700, 80.270700));
        let b = quantized(GeoPoint::new(13.082701, 80.270700));
        let c = quantized(GeoPoint::new(13.0827000001, 80.2707));
        assert_ne!(a, b);
        assert_eq!(a, c);
    }
}
