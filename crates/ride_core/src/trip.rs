//! Trip lifecycle vocabulary: states, status snapshots, and the events the
//! engine publishes while a simulation runs.

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::geo::GeoPoint;

/// The stages of a simulated ride, in strict order. `Idle` is initial,
/// `Completed` is terminal, and no transition skips a stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripState {
    /// No ride requested yet, or the engine was reset.
    #[default]
    Idle,
    /// The driver is approaching the pickup point.
    DriverArriving,
    /// The rider is aboard, heading to the drop point.
    OnTrip,
    /// The ride ended at the drop point.
    Completed,
}

/// A snapshot of the vehicle mid-animation. Immutable once emitted;
/// consumers never see a live reference into the engine's route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TripStatus {
    pub position: GeoPoint,
    /// Compass heading in degrees, `[0, 360)`.
    pub heading_deg: f32,
    /// Haversine distance from the current position to the leg target.
    pub distance_to_target_km: f64,
    /// True once the vehicle is within the arrival threshold of the target.
    pub has_arrived: bool,
    pub state: TripState,
}

/// One item on the status stream.
#[derive(Debug, Clone, PartialEq)]
pub enum TripEvent {
    /// The lifecycle moved to a new state.
    Transition(TripState),
    /// A periodic position/heading snapshot.
    Status(TripStatus),
    /// The run ended early; no further events follow.
    Failed(SimError),
}
