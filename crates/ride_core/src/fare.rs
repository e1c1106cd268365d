//! Tiered fare calculation.
//!
//! Each vehicle class maps to a static rate card entry. The fare is a
//! piecewise-linear function of distance (flat minimum, tier-1 rate, tier-2
//! rate), plus a fixed pickup charge and a per-minute waiting surcharge
//! after the first free minutes.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// The closed set of bookable vehicle classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleClass {
    Auto,
    CompactAc,
    Sedan,
    Suv,
    SuvPlus,
}

impl VehicleClass {
    /// All classes, in catalog order.
    pub const ALL: [VehicleClass; 5] = [
        VehicleClass::Auto,
        VehicleClass::CompactAc,
        VehicleClass::Sedan,
        VehicleClass::Suv,
        VehicleClass::SuvPlus,
    ];

    /// Rate card entry for this class.
    pub fn fare_config(self) -> &'static FareConfig {
        &RATE_CARD[self as usize]
    }
}

/// Rate card entry for one vehicle class.
///
/// `min_fare` is flat for trips up to `min_fare_km`; `tier1_rate_per_km`
/// applies up to `tier2_start_km`, `tier2_rate_per_km` beyond it. A class
/// with `tier2_start_km == min_fare_km` collapses to a single flat per-km
/// rate past the minimum and flows through the same arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FareConfig {
    pub min_fare: f64,
    pub min_fare_km: f64,
    pub tier1_rate_per_km: f64,
    pub tier2_start_km: f64,
    pub tier2_rate_per_km: f64,
    pub pickup_charge: f64,
    pub wait_charge_per_minute: f64,
}

/// Waiting minutes that are free of charge on every class.
pub const FREE_WAIT_MINUTES: i64 = 3;

/// Static rate card, indexed by [`VehicleClass`] discriminant.
static RATE_CARD: [FareConfig; 5] = [
    // Auto
    FareConfig {
        min_fare: 35.0,
        min_fare_km: 2.0,
        tier1_rate_per_km: 16.0,
        tier2_start_km: 2.0,
        tier2_rate_per_km: 16.0,
        pickup_charge: 20.0,
        wait_charge_per_minute: 1.5,
    },
    // CompactAc
    FareConfig {
        min_fare: 110.0,
        min_fare_km: 4.0,
        tier1_rate_per_km: 19.0,
        tier2_start_km: 10.0,
        tier2_rate_per_km: 17.0,
        pickup_charge: 20.0,
        wait_charge_per_minute: 1.5,
    },
    // Sedan
    FareConfig {
        min_fare: 130.0,
        min_fare_km: 4.0,
        tier1_rate_per_km: 22.0,
        tier2_start_km: 10.0,
        tier2_rate_per_km: 19.0,
        pickup_charge: 20.0,
        wait_charge_per_minute: 1.5,
    },
    // Suv
    FareConfig {
        min_fare: 200.0,
        min_fare_km: 4.0,
        tier1_rate_per_km: 30.0,
        tier2_start_km: 20.0,
        tier2_rate_per_km: 26.0,
        pickup_charge: 20.0,
        wait_charge_per_minute: 1.5,
    },
    // SuvPlus: no second tier, flat rate after the minimum distance.
    FareConfig {
        min_fare: 300.0,
        min_fare_km: 4.0,
        tier1_rate_per_km: 38.0,
        tier2_start_km: 4.0,
        tier2_rate_per_km: 38.0,
        pickup_charge: 50.0,
        wait_charge_per_minute: 1.5,
    },
];

/// Computes the total fare in whole currency units, rounded half-up.
///
/// Negative or non-finite inputs are rejected with
/// [`SimError::Validation`] before they reach the formula.
pub fn quote(distance_km: f64, wait_minutes: i64, class: VehicleClass) -> Result<i64, SimError> {
    SimError::check_non_negative("distance_km", distance_km)?;
    SimError::check_non_negative("wait_minutes", wait_minutes as f64)?;

    let config = class.fare_config();

    let base = if distance_km <= config.min_fare_km {
        config.min_fare
    } else if distance_km <= config.tier2_start_km {
        config.min_fare + (distance_km - config.min_fare_km) * config.tier1_rate_per_km
    } else {
        let tier1_km = config.tier2_start_km - config.min_fare_km;
        let tier2_km = distance_km - config.tier2_start_km;
        config.min_fare
            + tier1_km * config.tier1_rate_per_km
            + tier2_km * config.tier2_rate_per_km
    };

    let billable_wait = (wait_minutes - FREE_WAIT_MINUTES).max(0) as f64;
    let wait_charge = billable_wait * config.wait_charge_per_minute;

    Ok((base + config.pickup_charge + wait_charge).round() as i64)
}

/// A priced quote for one vehicle class. Always a pure derivation of its
/// inputs; recompute rather than mutate when distance or class changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareQuote {
    pub vehicle_class: VehicleClass,
    pub amount: i64,
}

impl FareQuote {
    pub fn derive(
        distance_km: f64,
        wait_minutes: i64,
        vehicle_class: VehicleClass,
    ) -> Result<Self, SimError> {
        Ok(Self {
            vehicle_class,
            amount: quote(distance_km, wait_minutes, vehicle_class)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_auto_trip_pays_the_minimum() {
        assert_eq!(quote(1.8, 0, VehicleClass::Auto), Ok(55));
    }

    #[test]
    fn auto_trip_past_minimum_adds_per_km_and_wait() {
        assert_eq!(quote(6.5, 5, VehicleClass::Auto), Ok(130));
    }

    #[test]
    fn compact_ac_trip_crosses_into_tier_two() {
        assert_eq!(quote(12.0, 7, VehicleClass::CompactAc), Ok(284));
    }

    #[test]
    fn sedan_trip_rounds_half_up() {
        // 300 + 20 + 4.5 = 324.5
        assert_eq!(quote(12.0, 6, VehicleClass::Sedan), Ok(325));
    }

    #[test]
    fn suv_long_trip_uses_both_tiers() {
        assert_eq!(quote(25.0, 9, VehicleClass::Suv), Ok(839));
    }

    #[test]
    fn suv_plus_collapsed_tier_is_a_flat_rate() {
        assert_eq!(quote(20.0, 8, VehicleClass::SuvPlus), Ok(966));
    }

    #[test]
    fn first_three_waiting_minutes_are_free() {
        let base = quote(1.0, 0, VehicleClass::Auto).expect("fare");
        assert_eq!(quote(1.0, 3, VehicleClass::Auto), Ok(base));
        assert_eq!(quote(1.0, 4, VehicleClass::Auto), Ok(base + 2)); // 1.5 rounded up with the total
    }

    #[test]
    fn negative_inputs_are_rejected() {
        assert!(matches!(
            quote(-0.1, 0, VehicleClass::Sedan),
            Err(SimError::Validation { field: "distance_km", .. })
        ));
        assert!(matches!(
            quote(3.0, -1, VehicleClass::Sedan),
            Err(SimError::Validation { field: "wait_minutes", .. })
        ));
    }

    #[test]
    fn every_class_has_a_rate_card_entry() {
        for class in VehicleClass::ALL {
            let config = class.fare_config();
            assert!(config.min_fare > 0.0);
            assert!(config.tier2_start_km >= config.min_fare_km);
        }
    }

    #[test]
    fn quote_derivation_carries_the_class() {
        let derived = FareQuote::derive(6.5, 5, VehicleClass::Auto).expect("quote");
        assert_eq!(derived.vehicle_class, VehicleClass::Auto);
        assert_eq!(derived.amount, 130);
    }
}
