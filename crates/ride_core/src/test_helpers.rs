//! Test helpers for common test setup and utilities.
//!
//! This module provides shared fixtures to reduce duplication across test
//! files: well-known coordinates, canned route backends, and a simulator
//! configuration that runs a whole trip instantly.

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::clock::InstantTicker;
use crate::geo::GeoPoint;
use crate::routing::{RouteInfo, RouteProvider};
use crate::simulator::{SimulatorConfig, TripSimulator};
use crate::trip::TripEvent;

/// A standard pickup point used across test files: central Chennai.
pub fn test_pickup() -> GeoPoint {
    GeoPoint::new(13.0827, 80.2707)
}

/// A standard drop point roughly 14 km from [`test_pickup`].
pub fn test_drop() -> GeoPoint {
    GeoPoint::new(12.9941, 80.1808)
}

/// Builds a straight route with `intermediate` evenly spaced waypoints
/// between the endpoints, using plain coordinate interpolation.
pub fn straight_waypoints(from: GeoPoint, to: GeoPoint, intermediate: usize) -> Vec<GeoPoint> {
    let mut waypoints = Vec::with_capacity(intermediate + 2);
    waypoints.push(from);
    for step in 1..=intermediate {
        let t = step as f64 / (intermediate + 1) as f64;
        waypoints.push(GeoPoint::new(
            from.latitude + (to.latitude - from.latitude) * t,
            from.longitude + (to.longitude - from.longitude) * t,
        ));
    }
    waypoints.push(to);
    waypoints
}

/// Backend that answers every query with a clone of one canned route.
pub struct CannedRouteProvider {
    info: RouteInfo,
}

impl CannedRouteProvider {
    pub fn new(info: RouteInfo) -> Self {
        Self { info }
    }
}

impl RouteProvider for CannedRouteProvider {
    fn route(&self, _from: GeoPoint, _to: GeoPoint) -> Option<RouteInfo> {
        Some(self.info.clone())
    }
}

/// Backend that never has a route.
pub struct UnavailableRouteProvider;

impl RouteProvider for UnavailableRouteProvider {
    fn route(&self, _from: GeoPoint, _to: GeoPoint) -> Option<RouteInfo> {
        None
    }
}

/// Backend that answers queries from a fixed script, in order, then goes
/// unavailable. Also counts how many times it was asked.
pub struct ScriptedRouteProvider {
    script: Mutex<VecDeque<Option<RouteInfo>>>,
    calls: Mutex<usize>,
}

impl ScriptedRouteProvider {
    pub fn new(script: Vec<Option<RouteInfo>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(0),
        }
    }

    /// Number of queries the backend has served so far.
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RouteProvider for ScriptedRouteProvider {
    fn route(&self, _from: GeoPoint, _to: GeoPoint) -> Option<RouteInfo> {
        *self.calls.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .flatten()
    }
}

/// Canned route between the standard test endpoints.
pub fn test_route(from: GeoPoint, to: GeoPoint) -> RouteInfo {
    RouteInfo {
        distance_km: crate::geo::distance_km(from, to),
        duration_minutes: 20.0,
        waypoints: straight_waypoints(from, to, 3),
    }
}

/// A configuration that runs a whole trip without wall-clock delays:
/// few steps, no curb dwell, fixed seed.
pub fn fast_config() -> SimulatorConfig {
    SimulatorConfig::default()
        .with_seed(7)
        .with_steps_per_segment(4)
        .with_pickup_dwell_ms(0)
}

/// A simulator over `provider` that pauses instantly, with [`fast_config`].
pub fn instant_simulator(provider: Arc<dyn RouteProvider>) -> TripSimulator {
    TripSimulator::with_ticker(provider, fast_config(), Arc::new(InstantTicker))
}

/// Collects every event of a run, waiting up to five seconds for each one.
///
/// # Panics
///
/// Panics if the stream stays silent for five seconds while the worker is
/// still connected (a hung simulation).
pub fn drain_events(receiver: &Receiver<TripEvent>) -> Vec<TripEvent> {
    let mut events = Vec::new();
    loop {
        match receiver.recv_timeout(Duration::from_secs(5)) {
            Ok(event) => events.push(event),
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => return events,
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                panic!("simulation produced no event for 5 s")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_waypoints_span_the_endpoints() {
        let waypoints = straight_waypoints(test_pickup(), test_drop(), 3);
        assert_eq!(waypoints.len(), 5);
        assert_eq!(waypoints[0], test_pickup());
        assert_eq!(waypoints[4], test_drop());
    }

    #[test]
    fn scripted_provider_replays_then_dries_up() {
        let route = test_route(test_pickup(), test_drop());
        let provider = ScriptedRouteProvider::new(vec![Some(route), None]);

        assert!(provider.route(test_pickup(), test_drop()).is_some());
        assert!(provider.route(test_pickup(), test_drop()).is_none());
        // Script exhausted: everything after is unavailable.
        assert!(provider.route(test_pickup(), test_drop()).is_none());
        assert_eq!(provider.call_count(), 3);
    }

    #[test]
    fn fast_config_has_no_dwell() {
        let config = fast_config();
        assert_eq!(config.pickup_dwell_ms, 0);
        assert_eq!(config.seed, Some(7));
    }
}
