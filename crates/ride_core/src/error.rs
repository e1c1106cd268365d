//! Engine error taxonomy.
//!
//! Every variant is terminal for the operation that raised it; the engine
//! never retries internally. Retries, if wanted, belong to the routing
//! backend or the caller.

use thiserror::Error;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// An input was outside the domain of the formula it was headed for
    /// (negative distance or wait time, out-of-range coordinate).
    #[error("invalid {field}: {value} is outside the accepted range")]
    Validation { field: &'static str, value: f64 },

    /// A leg was asked to run over a route with fewer than two waypoints.
    #[error("route has {waypoints} waypoint(s); a leg needs at least two")]
    InvalidRoute { waypoints: usize },

    /// A segment was requested from a route that has already been consumed.
    #[error("route is exhausted")]
    EmptyRoute,

    /// `start_simulation` was called while a run is active (or the previous
    /// run has not been cleared with `reset`).
    #[error("a simulation is already running for this trip")]
    SimulationAlreadyRunning,

    /// The routing backend returned no route between two points.
    #[error("no route available from {from} to {to}")]
    RouteUnavailable { from: GeoPoint, to: GeoPoint },
}

impl SimError {
    /// Reject a negative or non-finite numeric input.
    pub(crate) fn check_non_negative(field: &'static str, value: f64) -> Result<(), SimError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(SimError::Validation { field, value })
        }
    }
}
