//! Simulate one ride end to end and print the quote sheet and status stream.
//!
//! Run with: cargo run -p ride_core --example trip_run

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;

use ride_core::catalog::{self, RideIdentity};
use ride_core::fare::VehicleClass;
use ride_core::geo::GeoPoint;
use ride_core::routing::DirectRouteProvider;
use ride_core::simulator::{SimulatorConfig, TripSimulator};
use ride_core::trip::TripEvent;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ride_core=info".into()),
        )
        .init();

    // Central Chennai to Chromepet, roughly 14 km.
    let pickup = GeoPoint::new(13.0827, 80.2707);
    let drop = GeoPoint::new(12.9941, 80.1808);

    let provider = Arc::new(DirectRouteProvider::new(3));
    let config = SimulatorConfig::default()
        .with_seed(42)
        .with_steps_per_segment(6);
    let mut simulator = TripSimulator::new(provider, config);

    let plan = simulator.plan(pickup, drop).expect("route should resolve");
    println!(
        "--- Trip plan: {:.1} km, ~{:.0} min ---",
        plan.route.distance_km, plan.route.duration_minutes
    );
    for (quote, detail) in plan.quotes.iter().zip(catalog::catalog()) {
        println!(
            "  {:10} {:>5}  ({} seats, {})",
            detail.display_name, quote.amount, detail.seats, detail.description
        );
    }

    let mut rng = StdRng::seed_from_u64(42);
    let identity = RideIdentity::generate(&mut rng, VehicleClass::Sedan);
    println!(
        "\nBooked {} with driver {} ({}), OTP {}\n",
        identity.ride_id, identity.driver_name, identity.plate, identity.otp
    );

    let receiver = simulator
        .start_simulation(pickup, drop)
        .expect("simulation should start");

    let mut status_count = 0usize;
    for event in receiver {
        match event {
            TripEvent::Transition(state) => {
                println!("== {state:?} ==");
            }
            TripEvent::Status(status) => {
                status_count += 1;
                if status_count % 6 == 0 || status.has_arrived {
                    println!(
                        "  at ({:.5}, {:.5})  heading {:>5.1}°  {:.2} km to target{}",
                        status.position.latitude,
                        status.position.longitude,
                        status.heading_deg,
                        status.distance_to_target_km,
                        if status.has_arrived { "  [arrived]" } else { "" },
                    );
                }
            }
            TripEvent::Failed(error) => {
                println!("!! {error}");
            }
        }
    }

    println!(
        "\nFinal state: {:?} ({} status snapshots)",
        simulator.state(),
        status_count
    );
}
