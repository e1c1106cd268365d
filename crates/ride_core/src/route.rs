//! The remaining path of an in-flight leg.
//!
//! A [`RouteTracker`] wraps the ordered waypoint sequence still ahead of the
//! vehicle and hands it out segment by segment. The sequence only ever
//! shrinks: once a segment has been traversed the front waypoint is dropped
//! and the next segment starts where the previous one ended.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::geo::{self, GeoPoint};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTracker {
    remaining: VecDeque<GeoPoint>,
}

impl RouteTracker {
    pub fn new(waypoints: Vec<GeoPoint>) -> Self {
        Self {
            remaining: waypoints.into(),
        }
    }

    /// Number of waypoints still ahead, including the current position.
    pub fn waypoint_count(&self) -> usize {
        self.remaining.len()
    }

    /// Segments left to traverse: `max(0, waypoints - 1)`.
    pub fn segment_count(&self) -> usize {
        self.remaining.len().saturating_sub(1)
    }

    /// The segment the vehicle is about to traverse (first two waypoints).
    pub fn current_segment(&self) -> Result<(GeoPoint, GeoPoint), SimError> {
        match (self.remaining.front(), self.remaining.get(1)) {
            (Some(&start), Some(&end)) => Ok((start, end)),
            _ => Err(SimError::EmptyRoute),
        }
    }

    /// Drops the waypoint behind the segment just traversed. The route
    /// strictly shrinks; advancing an exhausted route is an error.
    pub fn advance_past_segment(&mut self) -> Result<(), SimError> {
        if self.segment_count() == 0 {
            return Err(SimError::EmptyRoute);
        }
        self.remaining.pop_front();
        Ok(())
    }

    pub fn is_exhausted(&self) -> bool {
        self.segment_count() == 0
    }

    /// Haversine length of everything still ahead.
    pub fn remaining_distance_km(&self) -> f64 {
        self.remaining
            .iter()
            .zip(self.remaining.iter().skip(1))
            .map(|(&a, &b)| geo::distance_km(a, b))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_point_route() -> RouteTracker {
        RouteTracker::new(vec![
            GeoPoint::new(13.00, 80.20),
            GeoPoint::new(13.01, 80.21),
            GeoPoint::new(13.02, 80.22),
        ])
    }

    #[test]
    fn segment_count_is_one_less_than_waypoints() {
        let route = three_point_route();
        assert_eq!(route.waypoint_count(), 3);
        assert_eq!(route.segment_count(), 2);
        assert!(!route.is_exhausted());
    }

    #[test]
    fn advancing_strictly_decreases_segment_count() {
        let mut route = three_point_route();
        let before = route.segment_count();
        route.advance_past_segment().expect("advance");
        assert_eq!(route.segment_count(), before - 1);
        route.advance_past_segment().expect("advance");
        assert_eq!(route.segment_count(), 0);
        assert!(route.is_exhausted());
    }

    #[test]
    fn segments_are_consumed_front_to_back() {
        let mut route = three_point_route();
        let (first_start, first_end) = route.current_segment().expect("segment");
        route.advance_past_segment().expect("advance");
        let (second_start, _) = route.current_segment().expect("segment");
        assert_eq!(second_start, first_end);
        assert_ne!(second_start, first_start);
    }

    #[test]
    fn exhausted_route_refuses_every_operation() {
        let mut route = RouteTracker::new(vec![GeoPoint::new(13.0, 80.2)]);
        assert!(route.is_exhausted());
        assert_eq!(route.current_segment(), Err(SimError::EmptyRoute));
        assert_eq!(route.advance_past_segment(), Err(SimError::EmptyRoute));

        let mut empty = RouteTracker::new(Vec::new());
        assert_eq!(empty.segment_count(), 0);
        assert_eq!(empty.advance_past_segment(), Err(SimError::EmptyRoute));
    }

    #[test]
    fn remaining_distance_shrinks_with_the_route() {
        let mut route = three_point_route();
        let full = route.remaining_distance_km();
        assert!(full > 0.0);
        route.advance_past_segment().expect("advance");
        let rest = route.remaining_distance_km();
        assert!(rest < full);
        route.advance_past_segment().expect("advance");
        assert_eq!(route.remaining_distance_km(), 0.0);
    }
}
