//! Directions-style HTTP route backend.
//!
//! Speaks the `directions/json` wire shape: origin/destination as
//! `lat,lng` query params, a key, and a response carrying per-leg distance
//! in meters, duration in seconds, and an encoded overview polyline. Any
//! transport, decode, or status failure maps to `None`; the caller treats
//! that as "unavailable" and stops.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::geo::GeoPoint;
use crate::routing::{polyline, RouteInfo, RouteProvider};

pub struct GoogleDirectionsProvider {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl GoogleDirectionsProvider {
    pub fn new(endpoint: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }
}

/// Minimal response structures; unknown fields are ignored.
#[derive(Deserialize)]
struct DirectionsResponse {
    status: String,
    routes: Option<Vec<DirectionsRoute>>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    legs: Vec<DirectionsLeg>,
    overview_polyline: OverviewPolyline,
}

#[derive(Deserialize)]
struct DirectionsLeg {
    distance: ValueField,
    duration: ValueField,
}

#[derive(Deserialize)]
struct ValueField {
    /// Meters for distances, seconds for durations.
    value: f64,
}

#[derive(Deserialize)]
struct OverviewPolyline {
    points: String,
}

fn to_route_info(route: DirectionsRoute) -> Option<RouteInfo> {
    let DirectionsRoute {
        legs,
        overview_polyline,
    } = route;

    let leg = legs.first()?;
    let waypoints = polyline::decode(&overview_polyline.points)?;
    if waypoints.len() < 2 {
        return None;
    }

    Some(RouteInfo {
        distance_km: leg.distance.value / 1000.0,
        duration_minutes: leg.duration.value / 60.0,
        waypoints,
    })
}

impl RouteProvider for GoogleDirectionsProvider {
    fn route(&self, from: GeoPoint, to: GeoPoint) -> Option<RouteInfo> {
        let url = format!(
            "{}/directions/json?origin={},{}&destination={},{}&key={}",
            self.endpoint,
            from.latitude,
            from.longitude,
            to.latitude,
            to.longitude,
            self.api_key,
        );

        let response: DirectionsResponse = match self.client.get(&url).send() {
            Ok(response) => match response.json() {
                Ok(parsed) => parsed,
                Err(error) => {
                    tracing::warn!(%error, "directions response did not parse");
                    return None;
                }
            },
            Err(error) => {
                tracing::warn!(%error, "directions request failed");
                return None;
            }
        };

        if response.status != "OK" {
            tracing::warn!(status = %response.status, "directions backend refused the query");
            return None;
        }

        response.routes?.into_iter().next().and_then(to_route_info)
    }
}
