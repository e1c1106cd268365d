//! Trip lifecycle orchestration.
//!
//! A [`TripSimulator`] owns one trip at a time. `start_simulation` resolves
//! the driver's approach route, spawns a single worker thread, and hands the
//! caller a receiver of [`TripEvent`]s. The worker walks each leg segment by
//! segment, interpolating position and heading at fixed sub-steps, and is
//! the only writer of trip state; the consumer only ever sees owned
//! snapshots. `reset` cancels the worker at its next suspension point.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::clock::{CancelToken, SleepTicker, Ticker};
use crate::error::SimError;
use crate::fare::FareQuote;
use crate::geo::{self, BearingSector, GeoPoint};
use crate::route::RouteTracker;
use crate::routing::{RouteInfo, RouteProvider};
use crate::trip::{TripEvent, TripState, TripStatus};

/// Lower clamp on the per-step delay, milliseconds.
const MIN_STEP_MS: f64 = 10.0;
/// Upper clamp on the per-step delay, milliseconds. Also bounds how long a
/// cancellation can take to be observed.
const MAX_STEP_MS: f64 = 100.0;

/// Bound used by [`CompletionCheck::Lenient`] on the km-valued distance from
/// the final position to the drop point.
const LENIENT_COMPLETION_BOUND_KM: f64 = 50.0;

/// How the leg's final position is checked against the drop point.
///
/// The per-step arrival flag trips inside `arrival_threshold_km` (50 m by
/// default). `Lenient` compares the final haversine distance, still in km,
/// against a bound of 50, three orders of magnitude wider, so any on-route
/// finish completes the trip. `Strict` holds the final check to the same
/// threshold as the per-step flag. Both are deliberate options rather than
/// one normalized behavior; `Lenient` is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionCheck {
    #[default]
    Lenient,
    Strict,
}

/// Tunables for one simulated trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Assumed vehicle speed used to derive per-segment animation time.
    pub average_speed_kmh: f64,
    /// Interpolation sub-steps per route segment.
    pub steps_per_segment: u32,
    /// Distance at which the per-step arrival flag trips.
    pub arrival_threshold_km: f64,
    /// Inner radius of the driver spawn annulus around the pickup, meters.
    pub spawn_min_distance_m: f64,
    /// Outer radius of the driver spawn annulus, meters.
    pub spawn_max_distance_m: f64,
    /// Bearing sector the spawn point is drawn from.
    pub spawn_sector: BearingSector,
    /// Pause at the curb between arrival and boarding, milliseconds.
    pub pickup_dwell_ms: u64,
    pub completion_check: CompletionCheck,
    /// RNG seed for the spawn point; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            average_speed_kmh: 40.0,
            steps_per_segment: 30,
            arrival_threshold_km: 0.05,
            spawn_min_distance_m: 1000.0,
            spawn_max_distance_m: 2000.0,
            spawn_sector: BearingSector::default(),
            pickup_dwell_ms: 2000,
            completion_check: CompletionCheck::default(),
            seed: None,
        }
    }
}

impl SimulatorConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_average_speed_kmh(mut self, speed: f64) -> Self {
        self.average_speed_kmh = speed;
        self
    }

    pub fn with_steps_per_segment(mut self, steps: u32) -> Self {
        self.steps_per_segment = steps;
        self
    }

    pub fn with_arrival_threshold_km(mut self, threshold: f64) -> Self {
        self.arrival_threshold_km = threshold;
        self
    }

    pub fn with_spawn_annulus(mut self, min_m: f64, max_m: f64) -> Self {
        self.spawn_min_distance_m = min_m;
        self.spawn_max_distance_m = max_m;
        self
    }

    pub fn with_spawn_sector(mut self, sector: BearingSector) -> Self {
        self.spawn_sector = sector;
        self
    }

    pub fn with_pickup_dwell_ms(mut self, dwell_ms: u64) -> Self {
        self.pickup_dwell_ms = dwell_ms;
        self
    }

    pub fn with_completion_check(mut self, check: CompletionCheck) -> Self {
        self.completion_check = check;
        self
    }
}

/// Pre-booking result: the resolved route plus a fare for every class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub route: RouteInfo,
    /// One quote per vehicle class, in catalog order.
    pub quotes: Vec<FareQuote>,
}

/// Drives one trip at a time through the lifecycle
/// `Idle → DriverArriving → OnTrip → Completed`.
pub struct TripSimulator {
    config: SimulatorConfig,
    provider: Arc<dyn RouteProvider>,
    ticker: Arc<dyn Ticker>,
    state: Arc<Mutex<TripState>>,
    cancel: CancelToken,
    worker: Option<JoinHandle<()>>,
}

impl TripSimulator {
    /// Simulator paced in real time.
    pub fn new(provider: Arc<dyn RouteProvider>, config: SimulatorConfig) -> Self {
        Self::with_ticker(provider, config, Arc::new(SleepTicker))
    }

    /// Simulator with an explicit pacing source (tests use
    /// [`InstantTicker`](crate::clock::InstantTicker)).
    pub fn with_ticker(
        provider: Arc<dyn RouteProvider>,
        config: SimulatorConfig,
        ticker: Arc<dyn Ticker>,
    ) -> Self {
        Self {
            config,
            provider,
            ticker,
            state: Arc::new(Mutex::new(TripState::Idle)),
            cancel: CancelToken::new(),
            worker: None,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TripState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves the pickup→drop route and prices every vehicle class,
    /// using the route's estimated duration as the waiting allowance.
    pub fn plan(&self, pickup: GeoPoint, drop: GeoPoint) -> Result<TripPlan, SimError> {
        validate_point(pickup)?;
        validate_point(drop)?;

        let route = self
            .provider
            .route(pickup, drop)
            .ok_or(SimError::RouteUnavailable {
                from: pickup,
                to: drop,
            })?;

        let wait_minutes = (route.duration_minutes.round() as i64).max(0);
        let quotes = catalog::quote_sheet(route.distance_km, wait_minutes)?;
        Ok(TripPlan { route, quotes })
    }

    /// Starts the trip and returns the event stream.
    ///
    /// The driver start point is drawn from the spawn annulus around the
    /// pickup, and the approach route is resolved before any transition, so
    /// a failed start always leaves the state at `Idle`.
    pub fn start_simulation(
        &mut self,
        pickup: GeoPoint,
        drop: GeoPoint,
    ) -> Result<Receiver<TripEvent>, SimError> {
        validate_point(pickup)?;
        validate_point(drop)?;

        if let Some(handle) = self.worker.take() {
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                self.worker = Some(handle);
                return Err(SimError::SimulationAlreadyRunning);
            }
        }
        if self.state() != TripState::Idle {
            return Err(SimError::SimulationAlreadyRunning);
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let spawn = geo::random_point_in_annulus(
            &mut rng,
            pickup,
            self.config.spawn_min_distance_m,
            self.config.spawn_max_distance_m,
            self.config.spawn_sector,
        );

        let approach = self
            .provider
            .route(spawn, pickup)
            .ok_or(SimError::RouteUnavailable {
                from: spawn,
                to: pickup,
            })?;
        if approach.waypoints.len() < 2 {
            return Err(SimError::InvalidRoute {
                waypoints: approach.waypoints.len(),
            });
        }

        let (sender, receiver) = mpsc::channel();
        self.cancel = CancelToken::new();

        let worker = Worker {
            config: self.config.clone(),
            provider: Arc::clone(&self.provider),
            ticker: Arc::clone(&self.ticker),
            cancel: self.cancel.clone(),
            state: Arc::clone(&self.state),
            sender,
        };
        self.worker = Some(std::thread::spawn(move || {
            worker.run(approach, pickup, drop)
        }));
        Ok(receiver)
    }

    /// Cancels any in-flight run and returns to `Idle`.
    ///
    /// The worker observes the token at its next suspension point, bounded
    /// by one step interval; no event for the aborted run is emitted after
    /// that.
    pub fn reset(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = TripState::Idle;
    }
}

impl Drop for TripSimulator {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

fn validate_point(point: GeoPoint) -> Result<(), SimError> {
    if !point.latitude.is_finite() || point.latitude.abs() > 90.0 {
        return Err(SimError::Validation {
            field: "latitude",
            value: point.latitude,
        });
    }
    if !point.longitude.is_finite() || point.longitude.abs() > 180.0 {
        return Err(SimError::Validation {
            field: "longitude",
            value: point.longitude,
        });
    }
    Ok(())
}

/// The single cooperative task behind one run. Owns the route and position
/// for the duration; everything it publishes is an owned snapshot.
struct Worker {
    config: SimulatorConfig,
    provider: Arc<dyn RouteProvider>,
    ticker: Arc<dyn Ticker>,
    cancel: CancelToken,
    state: Arc<Mutex<TripState>>,
    sender: Sender<TripEvent>,
}

impl Worker {
    fn run(self, approach: RouteInfo, pickup: GeoPoint, drop: GeoPoint) {
        if self.transition(TripState::DriverArriving).is_err() {
            return;
        }

        let mut heading = 0.0_f32;
        let mut route = RouteTracker::new(approach.waypoints);
        match self.run_leg(&mut route, pickup, TripState::DriverArriving, &mut heading) {
            Ok(Some(_)) => {}
            Ok(None) => return,
            Err(error) => {
                self.fail(error);
                return;
            }
        }
        tracing::debug!("driver reached the pickup point");

        // Curb dwell while the rider boards.
        if !self.pause_cancellable(self.config.pickup_dwell_ms) {
            return;
        }

        if self.transition(TripState::OnTrip).is_err() {
            return;
        }

        let Some(trip_route) = self.provider.route(pickup, drop) else {
            self.fail(SimError::RouteUnavailable {
                from: pickup,
                to: drop,
            });
            return;
        };

        let mut route = RouteTracker::new(trip_route.waypoints);
        let final_position = match self.run_leg(&mut route, drop, TripState::OnTrip, &mut heading) {
            Ok(Some(position)) => position,
            Ok(None) => return,
            Err(error) => {
                self.fail(error);
                return;
            }
        };

        let distance_to_drop = geo::distance_km(final_position, drop);
        let bound = match self.config.completion_check {
            CompletionCheck::Lenient => LENIENT_COMPLETION_BOUND_KM,
            CompletionCheck::Strict => self.config.arrival_threshold_km,
        };
        if distance_to_drop < bound {
            let _ = self.transition(TripState::Completed);
        } else {
            tracing::warn!(
                distance_to_drop,
                "final position missed the drop point; staying on trip until reset"
            );
        }
    }

    /// Walks the remaining route segment by segment, emitting a status per
    /// sub-step. Returns the final emitted position, or `None` if the run
    /// was cancelled or the consumer went away.
    fn run_leg(
        &self,
        route: &mut RouteTracker,
        target: GeoPoint,
        state: TripState,
        heading: &mut f32,
    ) -> Result<Option<GeoPoint>, SimError> {
        if route.segment_count() < 1 {
            return Err(SimError::InvalidRoute {
                waypoints: route.waypoint_count(),
            });
        }

        let mut position = route.current_segment()?.0;
        let steps = self.config.steps_per_segment.max(1);

        while !route.is_exhausted() {
            let (start, end) = route.current_segment()?;
            let segment_km = geo::distance_km(start, end);
            let target_bearing = geo::initial_bearing_deg(start, end);
            let start_heading = *heading;

            let duration_ms = segment_km / self.config.average_speed_kmh * 3_600_000.0;
            let step_ms = (duration_ms / f64::from(steps)).clamp(MIN_STEP_MS, MAX_STEP_MS) as u64;

            for step in 1..=steps {
                if self.cancel.is_cancelled() {
                    return Ok(None);
                }

                let t = step as f32 / steps as f32;
                let eased = geo::ease_in_out_cubic(t);

                // Plain linear blend per coordinate, not great-circle
                // interpolation; segments are short enough for it.
                position = GeoPoint::new(
                    start.latitude + (end.latitude - start.latitude) * f64::from(eased),
                    start.longitude + (end.longitude - start.longitude) * f64::from(eased),
                );
                *heading = geo::lerp_angle_deg(start_heading, target_bearing, eased);

                let distance_to_target_km = geo::distance_km(position, target);
                let status = TripStatus {
                    position,
                    heading_deg: *heading,
                    distance_to_target_km,
                    has_arrived: distance_to_target_km < self.config.arrival_threshold_km,
                    state,
                };
                if self.sender.send(TripEvent::Status(status)).is_err() {
                    return Ok(None);
                }

                self.ticker.pause(Duration::from_millis(step_ms));
            }

            route.advance_past_segment()?;
        }

        Ok(Some(position))
    }

    /// Pauses in cancellable slices no longer than one step interval.
    /// Returns false once cancelled.
    fn pause_cancellable(&self, total_ms: u64) -> bool {
        let mut remaining = total_ms;
        while remaining > 0 {
            if self.cancel.is_cancelled() {
                return false;
            }
            let slice = remaining.min(MAX_STEP_MS as u64);
            self.ticker.pause(Duration::from_millis(slice));
            remaining -= slice;
        }
        !self.cancel.is_cancelled()
    }

    fn transition(&self, next: TripState) -> Result<(), ()> {
        if self.cancel.is_cancelled() {
            return Err(());
        }
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
        tracing::info!(state = ?next, "trip state changed");
        self.sender.send(TripEvent::Transition(next)).map_err(|_| ())
    }

    /// Terminal error event; the run aborts back to `Idle`.
    fn fail(&self, error: SimError) {
        tracing::warn!(%error, "simulation aborted");
        let _ = self.sender.send(TripEvent::Failed(error));
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = TripState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::InstantTicker;
    use crate::routing::DirectRouteProvider;
    use std::sync::mpsc::TryRecvError;

    fn pickup() -> GeoPoint {
        GeoPoint::new(13.0827, 80.2707)
    }

    fn drop_point() -> GeoPoint {
        GeoPoint::new(12.9941, 80.1808)
    }

    fn test_worker(config: SimulatorConfig) -> (Worker, Receiver<TripEvent>) {
        let (sender, receiver) = mpsc::channel();
        let worker = Worker {
            config,
            provider: Arc::new(DirectRouteProvider::default()),
            ticker: Arc::new(InstantTicker),
            cancel: CancelToken::new(),
            state: Arc::new(Mutex::new(TripState::Idle)),
            sender,
        };
        (worker, receiver)
    }

    fn straight_route(from: GeoPoint, to: GeoPoint) -> RouteTracker {
        let info = DirectRouteProvider::new(3).route(from, to).expect("route");
        RouteTracker::new(info.waypoints)
    }

    #[test]
    fn default_config_matches_the_animation_constants() {
        let config = SimulatorConfig::default();
        assert_eq!(config.average_speed_kmh, 40.0);
        assert_eq!(config.steps_per_segment, 30);
        assert_eq!(config.arrival_threshold_km, 0.05);
        assert_eq!(config.pickup_dwell_ms, 2000);
        assert_eq!(config.completion_check, CompletionCheck::Lenient);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn builders_override_the_defaults() {
        let config = SimulatorConfig::default()
            .with_seed(9)
            .with_steps_per_segment(4)
            .with_pickup_dwell_ms(0)
            .with_completion_check(CompletionCheck::Strict);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.steps_per_segment, 4);
        assert_eq!(config.pickup_dwell_ms, 0);
        assert_eq!(config.completion_check, CompletionCheck::Strict);
    }

    #[test]
    fn run_leg_emits_a_status_per_step() {
        let config = SimulatorConfig::default()
            .with_steps_per_segment(5)
            .with_seed(1);
        let (worker, receiver) = test_worker(config);

        let mut route = straight_route(pickup(), drop_point());
        let segments = route.segment_count();
        let mut heading = 0.0;

        let final_position = worker
            .run_leg(&mut route, drop_point(), TripState::OnTrip, &mut heading)
            .expect("leg")
            .expect("not cancelled");

        let statuses: Vec<_> = receiver.try_iter().collect();
        assert_eq!(statuses.len(), segments * 5);
        assert!(route.is_exhausted());

        // The last status carries the final position and has arrived.
        let TripEvent::Status(last) = statuses.last().expect("status") else {
            panic!("expected a status event");
        };
        assert_eq!(last.position, final_position);
        assert!(last.has_arrived);
        assert_eq!(last.state, TripState::OnTrip);
    }

    #[test]
    fn run_leg_distances_shrink_toward_the_target() {
        let config = SimulatorConfig::default().with_steps_per_segment(6);
        let (worker, receiver) = test_worker(config);

        let mut route = straight_route(pickup(), drop_point());
        let mut heading = 0.0;
        worker
            .run_leg(&mut route, drop_point(), TripState::DriverArriving, &mut heading)
            .expect("leg")
            .expect("not cancelled");

        let distances: Vec<f64> = receiver
            .try_iter()
            .filter_map(|event| match event {
                TripEvent::Status(status) => Some(status.distance_to_target_km),
                _ => None,
            })
            .collect();

        let first = distances.first().copied().expect("statuses");
        let last = distances.last().copied().expect("statuses");
        assert!(last < first);
        assert!(last < 0.05);
        for distance in &distances {
            assert!(distance.is_finite());
        }
    }

    #[test]
    fn run_leg_headings_stay_normalized() {
        let config = SimulatorConfig::default().with_steps_per_segment(4);
        let (worker, receiver) = test_worker(config);

        let mut route = straight_route(pickup(), drop_point());
        let mut heading = 350.0;
        worker
            .run_leg(&mut route, drop_point(), TripState::OnTrip, &mut heading)
            .expect("leg")
            .expect("not cancelled");

        for event in receiver.try_iter() {
            if let TripEvent::Status(status) = event {
                assert!((0.0..360.0).contains(&status.heading_deg));
            }
        }
    }

    #[test]
    fn run_leg_rejects_a_short_route() {
        let (worker, _receiver) = test_worker(SimulatorConfig::default());
        let mut route = RouteTracker::new(vec![pickup()]);
        let mut heading = 0.0;

        let result = worker.run_leg(&mut route, drop_point(), TripState::OnTrip, &mut heading);
        assert_eq!(result, Err(SimError::InvalidRoute { waypoints: 1 }));
    }

    #[test]
    fn cancelled_leg_stops_without_another_status() {
        let config = SimulatorConfig::default().with_steps_per_segment(8);
        let (worker, receiver) = test_worker(config);
        worker.cancel.cancel();

        let mut route = straight_route(pickup(), drop_point());
        let mut heading = 0.0;
        let outcome = worker
            .run_leg(&mut route, drop_point(), TripState::OnTrip, &mut heading)
            .expect("leg");

        assert_eq!(outcome, None);
        assert_eq!(receiver.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn validation_rejects_out_of_range_coordinates() {
        assert!(validate_point(GeoPoint::new(90.0, 180.0)).is_ok());
        assert!(matches!(
            validate_point(GeoPoint::new(91.0, 0.0)),
            Err(SimError::Validation { field: "latitude", .. })
        ));
        assert!(matches!(
            validate_point(GeoPoint::new(0.0, -181.0)),
            Err(SimError::Validation { field: "longitude", .. })
        ));
        assert!(validate_point(GeoPoint::new(f64::NAN, 0.0)).is_err());
    }

    #[test]
    fn plan_prices_every_class_for_the_route() {
        let simulator = TripSimulator::with_ticker(
            Arc::new(DirectRouteProvider::default()),
            SimulatorConfig::default(),
            Arc::new(InstantTicker),
        );

        let plan = simulator.plan(pickup(), drop_point()).expect("plan");
        assert_eq!(plan.quotes.len(), 5);
        assert!(plan.route.distance_km > 10.0);
        assert!(plan.route.waypoints.len() >= 2);
        // Dearer classes never quote below cheaper ones on the same route.
        for pair in plan.quotes.windows(2) {
            assert!(pair[0].amount <= pair[1].amount);
        }
    }
}
