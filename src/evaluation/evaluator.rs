//! Trip evaluator that computes cumulative load, distance and duration.

use std::collections::BTreeSet;

use crate::error::{OracleError, PlanError};
use crate::models::{Stop, Trip, Vehicle, Waypoint};
use crate::oracle::{DistanceOracle, TravelCostProvider};
use crate::registry::DemandRegistry;

/// A constraint a trip sequence breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Sum of demands exceeds the vehicle capacity.
    CapacityExceeded {
        /// Load of the trip.
        load: i64,
        /// Vehicle capacity.
        capacity: i32,
    },
    /// Sequence names a point the registry does not know.
    UnknownPoint {
        /// Offending id.
        point_id: usize,
    },
    /// Sequence visits the same point twice.
    RepeatedPoint {
        /// Offending id.
        point_id: usize,
    },
}

/// Turns a visiting sequence into a [`Trip`] with its metrics, checking
/// capacity along the way.
///
/// # Examples
///
/// ```
/// use u_dispatch::evaluation::TripEvaluator;
/// use u_dispatch::models::{DemandPoint, Depot, Location, Vehicle};
/// use u_dispatch::oracle::{CostSymmetry, DistanceOracle, EuclideanProvider};
/// use u_dispatch::registry::DemandRegistry;
///
/// let depot = Depot::new(Location::new(0.0, 0.0));
/// let points = vec![
///     DemandPoint::new(1, Location::new(4.0, 3.0), 10),
///     DemandPoint::new(2, Location::new(8.0, 6.0), 20),
/// ];
/// let registry = DemandRegistry::register(depot, points).registry;
/// let oracle = DistanceOracle::new(EuclideanProvider, CostSymmetry::Symmetric);
/// let vehicle = Vehicle::new(0, 100);
///
/// let evaluator = TripEvaluator::new(&registry, &oracle, &vehicle);
/// let (trip, violations) = evaluator.build_trip(&[1, 2], 1)?;
/// assert_eq!(trip.len(), 2);
/// assert!((trip.distance() - 20.0).abs() < 1e-10);
/// assert!(violations.is_empty());
/// # Ok::<(), u_dispatch::error::OracleError>(())
/// ```
pub struct TripEvaluator<'a, P> {
    registry: &'a DemandRegistry,
    oracle: &'a DistanceOracle<P>,
    vehicle: &'a Vehicle,
}

impl<'a, P: TravelCostProvider> TripEvaluator<'a, P> {
    /// Creates a new evaluator for the given run data.
    pub fn new(
        registry: &'a DemandRegistry,
        oracle: &'a DistanceOracle<P>,
        vehicle: &'a Vehicle,
    ) -> Self {
        Self {
            registry,
            oracle,
            vehicle,
        }
    }

    /// Builds a trip from a sequence of point ids, computing load and travel.
    ///
    /// Returns the trip and any constraint violations found. Unknown ids are
    /// reported and left out of the trip.
    pub fn build_trip(
        &self,
        point_ids: &[usize],
        round: usize,
    ) -> Result<(Trip, Vec<Violation>), OracleError> {
        let mut trip = Trip::new(self.vehicle.id(), round);
        let mut violations = Vec::new();
        let mut seen = BTreeSet::new();
        let depot = self.registry.depot().waypoint();
        let mut prev: Waypoint = depot;
        let mut load: i64 = 0;
        let mut distance = 0.0;
        let mut duration = 0.0;

        for &pid in point_ids {
            let Some(point) = self.registry.point(pid) else {
                violations.push(Violation::UnknownPoint { point_id: pid });
                continue;
            };
            if !seen.insert(pid) {
                violations.push(Violation::RepeatedPoint { point_id: pid });
            }

            let here = point.waypoint();
            let leg = self.oracle.cost(&prev, &here)?;
            distance += leg.distance;
            duration += leg.duration;
            load += i64::from(point.demand());

            trip.push_stop(Stop {
                point_id: pid,
                load_after: load,
                distance_to_here: distance,
                arrival_seconds: duration,
            });
            prev = here;
        }

        // Return to depot
        let back = self.oracle.cost(&prev, &depot)?;
        trip.set_distance(distance + back.distance);
        trip.set_duration(duration + back.duration);

        if load > i64::from(self.vehicle.capacity()) {
            violations.push(Violation::CapacityExceeded {
                load,
                capacity: self.vehicle.capacity(),
            });
        }

        Ok((trip, violations))
    }

    /// Like [`build_trip`](Self::build_trip), but any violation is an error.
    ///
    /// # Errors
    ///
    /// [`PlanError::InvalidTrip`] listing every violation, or
    /// [`PlanError::Oracle`] if a leg cost is unavailable.
    pub fn build_feasible_trip(
        &self,
        point_ids: &[usize],
        round: usize,
    ) -> Result<Trip, PlanError> {
        let (trip, violations) = self.build_trip(point_ids, round)?;
        if violations.is_empty() {
            Ok(trip)
        } else {
            Err(PlanError::InvalidTrip {
                vehicle: self.vehicle.id(),
                round,
                violations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DemandPoint, Depot, Location};
    use crate::oracle::{CostSymmetry, EuclideanProvider};

    fn setup() -> (DemandRegistry, DistanceOracle<EuclideanProvider>) {
        let depot = Depot::new(Location::new(0.0, 0.0));
        let points = vec![
            DemandPoint::new(1, Location::new(4.0, 3.0), 10),
            DemandPoint::new(2, Location::new(8.0, 6.0), 20),
            DemandPoint::new(3, Location::new(10.0, 0.0), 15),
        ];
        let registry = DemandRegistry::register(depot, points).registry;
        let oracle = DistanceOracle::new(EuclideanProvider, CostSymmetry::Symmetric);
        (registry, oracle)
    }

    #[test]
    fn test_build_trip_empty() {
        let (registry, oracle) = setup();
        let vehicle = Vehicle::new(0, 50);
        let eval = TripEvaluator::new(&registry, &oracle, &vehicle);
        let (trip, violations) = eval.build_trip(&[], 1).expect("trip");
        assert!(trip.is_empty());
        assert!(violations.is_empty());
        assert_eq!(trip.distance(), 0.0);
    }

    #[test]
    fn test_build_trip_single() {
        let (registry, oracle) = setup();
        let vehicle = Vehicle::new(0, 50);
        let eval = TripEvaluator::new(&registry, &oracle, &vehicle);
        let (trip, violations) = eval.build_trip(&[1], 1).expect("trip");
        assert!(violations.is_empty());
        // depot->1 = 5.0, 1->depot = 5.0
        assert!((trip.distance() - 10.0).abs() < 1e-10);
        assert!((trip.duration() - 10.0).abs() < 1e-10);
        assert_eq!(trip.load(), 10);
    }

    #[test]
    fn test_cumulative_stops() {
        let (registry, oracle) = setup();
        let vehicle = Vehicle::new(3, 50);
        let eval = TripEvaluator::new(&registry, &oracle, &vehicle);
        let (trip, _) = eval.build_trip(&[1, 2], 2).expect("trip");
        assert_eq!(trip.vehicle_id(), 3);
        assert_eq!(trip.round(), 2);
        let s = trip.stops();
        assert_eq!(s[0].load_after, 10);
        assert_eq!(s[1].load_after, 30);
        assert!((s[0].distance_to_here - 5.0).abs() < 1e-10);
        assert!((s[1].distance_to_here - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_capacity_violated() {
        let (registry, oracle) = setup();
        let vehicle = Vehicle::new(0, 25);
        let eval = TripEvaluator::new(&registry, &oracle, &vehicle);
        let (trip, violations) = eval.build_trip(&[1, 2, 3], 1).expect("trip");
        assert_eq!(trip.len(), 3);
        assert_eq!(
            violations,
            vec![Violation::CapacityExceeded {
                load: 45,
                capacity: 25
            }]
        );
    }

    #[test]
    fn test_unknown_and_repeated_points() {
        let (registry, oracle) = setup();
        let vehicle = Vehicle::new(0, 100);
        let eval = TripEvaluator::new(&registry, &oracle, &vehicle);
        let (trip, violations) = eval.build_trip(&[1, 9, 1], 1).expect("trip");
        assert_eq!(trip.point_ids(), vec![1, 1]);
        assert_eq!(
            violations,
            vec![
                Violation::UnknownPoint { point_id: 9 },
                Violation::RepeatedPoint { point_id: 1 }
            ]
        );
    }

    #[test]
    fn test_load_sums_past_i32_max() {
        let depot = Depot::new(Location::new(0.0, 0.0));
        let points = vec![
            DemandPoint::new(1, Location::new(0.0, 1.0), i32::MAX),
            DemandPoint::new(2, Location::new(0.0, 2.0), i32::MAX),
        ];
        let registry = DemandRegistry::register(depot, points).registry;
        let oracle = DistanceOracle::new(EuclideanProvider, CostSymmetry::Symmetric);
        let vehicle = Vehicle::new(0, i32::MAX);
        let eval = TripEvaluator::new(&registry, &oracle, &vehicle);

        let (trip, violations) = eval.build_trip(&[1, 2], 1).expect("trip");
        assert_eq!(trip.load(), 2 * i64::from(i32::MAX));
        assert_eq!(
            violations,
            vec![Violation::CapacityExceeded {
                load: 2 * i64::from(i32::MAX),
                capacity: i32::MAX
            }]
        );
    }

    #[test]
    fn test_feasible_trip_rejects_violations() {
        let (registry, oracle) = setup();
        let vehicle = Vehicle::new(4, 25);
        let eval = TripEvaluator::new(&registry, &oracle, &vehicle);

        let trip = eval.build_feasible_trip(&[1, 3], 2).expect("fits");
        assert_eq!(trip.load(), 25);

        let err = eval.build_feasible_trip(&[1, 2], 2).unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidTrip {
                vehicle: 4,
                round: 2,
                violations: vec![Violation::CapacityExceeded {
                    load: 30,
                    capacity: 25
                }],
            }
        );

        let err = eval.build_feasible_trip(&[3, 3], 1).unwrap_err();
        assert!(matches!(err, PlanError::InvalidTrip { .. }));
    }
}
