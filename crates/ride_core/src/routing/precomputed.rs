//! Pre-computed route tables for deterministic fixtures.
//!
//! A table maps quantized endpoint pairs to canned [`RouteInfo`] values and
//! can be built in memory or round-tripped through a bincode file.

use std::collections::HashMap;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;
use crate::routing::{quantized, RouteInfo, RouteProvider};

/// A serializable, hashable key for the route table: both endpoints
/// quantized to microdegrees.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct EndpointPair(pub (i64, i64), pub (i64, i64));

impl EndpointPair {
    pub fn new(from: GeoPoint, to: GeoPoint) -> Self {
        Self(quantized(from), quantized(to))
    }
}

/// Route table loaded from disk or built in memory. Lookups are exact on the
/// quantized endpoints; anything else is "unavailable".
pub struct PrecomputedRouteProvider {
    table: HashMap<EndpointPair, RouteInfo>,
}

impl PrecomputedRouteProvider {
    /// Load from a bincode-serialized file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let data = fs::read(path)?;
        let table: HashMap<EndpointPair, RouteInfo> = bincode::deserialize(&data)?;
        Ok(Self { table })
    }

    /// Create from an in-memory table (useful for tests).
    pub fn from_table(table: HashMap<EndpointPair, RouteInfo>) -> Self {
        Self { table }
    }

    /// Serialize a table to a file.
    pub fn save_to_file(
        table: &HashMap<EndpointPair, RouteInfo>,
        path: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = bincode::serialize(table)?;
        fs::write(path, data)?;
        Ok(())
    }
}

impl RouteProvider for PrecomputedRouteProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Option<RouteInfo> {
        self.table.get(&EndpointPair::new(from, to)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_route(from: GeoPoint, to: GeoPoint) -> RouteInfo {
        RouteInfo {
            distance_km: 14.2,
            duration_minutes: 25.0,
            waypoints: vec![from, to],
        }
    }

    #[test]
    fn serves_only_the_tabled_pair() {
        let from = GeoPoint::new(13.0827, 80.2707);
        let to = GeoPoint::new(12.9941, 80.1808);

        let mut table = HashMap::new();
        table.insert(EndpointPair::new(from, to), sample_route(from, to));
        let provider = PrecomputedRouteProvider::from_table(table);

        assert!(provider.route(from, to).is_some());
        // Reverse direction was never tabled.
        assert!(provider.route(to, from).is_none());
    }

    #[test]
    fn round_trips_through_a_file() {
        let from = GeoPoint::new(13.0827, 80.2707);
        let to = GeoPoint::new(12.9941, 80.1808);

        let mut table = HashMap::new();
        table.insert(EndpointPair::new(from, to), sample_route(from, to));

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("routes.bin");
        let path = path.to_str().expect("utf-8 path");

        PrecomputedRouteProvider::save_to_file(&table, path).expect("save");
        let provider = PrecomputedRouteProvider::from_file(path).expect("load");

        let info = provider.route(from, to).expect("route");
        assert_eq!(info.waypoints.len(), 2);
        assert!((info.distance_km - 14.2).abs() < 1e-12);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(PrecomputedRouteProvider::from_file("/nonexistent/routes.bin").is_err());
    }
}
