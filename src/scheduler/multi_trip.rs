//! Round-based multi-trip scheduling.
//!
//! Each round walks the fleet in id order. Every vehicle builds one trip
//! against whatever is still unserved, the trip is improved with 2-opt and
//! committed, and the vehicle is back at the depot for the next round. Rounds
//! repeat until nothing is left, or until a round serves nobody.

use std::collections::BTreeSet;

use log::{debug, info, trace, warn};

use crate::config::{PlannerConfig, UnservablePolicy};
use crate::constructive::nearest_feasible_insertion;
use crate::error::PlanError;
use crate::evaluation::TripEvaluator;
use crate::local_search::two_opt_improve;
use crate::models::{DemandPoint, Fleet, Plan, RoundSummary, Trip, Vehicle, Waypoint};
use crate::oracle::{DistanceOracle, TravelCostProvider};
use crate::registry::DemandRegistry;

/// Drives trip construction round after round until all demand is served.
///
/// # Examples
///
/// ```
/// use u_dispatch::config::PlannerConfig;
/// use u_dispatch::models::{DemandPoint, Depot, Fleet, Location};
/// use u_dispatch::oracle::{CostSymmetry, DistanceOracle, EuclideanProvider};
/// use u_dispatch::registry::DemandRegistry;
/// use u_dispatch::scheduler::MultiTripScheduler;
///
/// let depot = Depot::new(Location::new(0.0, 0.0));
/// let points = vec![
///     DemandPoint::new(1, Location::new(0.0, 1.0), 8),
///     DemandPoint::new(2, Location::new(0.0, 2.0), 8),
/// ];
/// let mut registry = DemandRegistry::register(depot, points).registry;
/// let oracle = DistanceOracle::new(EuclideanProvider, CostSymmetry::Symmetric);
/// let config = PlannerConfig::default();
///
/// let scheduler = MultiTripScheduler::new(&oracle, &config);
/// let plan = scheduler.run(&mut registry, &Fleet::uniform(1, 10))?;
/// assert_eq!(plan.num_trips(), 2);
/// assert_eq!(plan.round_count(), 2);
/// assert!(registry.is_complete());
/// # Ok::<(), u_dispatch::error::PlanError>(())
/// ```
pub struct MultiTripScheduler<'a, P> {
    oracle: &'a DistanceOracle<P>,
    config: &'a PlannerConfig,
}

impl<'a, P: TravelCostProvider> MultiTripScheduler<'a, P> {
    /// Creates a scheduler over a shared oracle.
    pub fn new(oracle: &'a DistanceOracle<P>, config: &'a PlannerConfig) -> Self {
        Self { oracle, config }
    }

    /// Plans every unserved point in `registry`, marking them served as
    /// trips are committed.
    ///
    /// # Errors
    ///
    /// - [`PlanError::UnservableDemand`] for a point heavier than every
    ///   vehicle, unless the config says to skip it.
    /// - [`PlanError::InfeasiblePlan`] when a round serves nobody while
    ///   demand remains (e.g. an empty fleet).
    /// - [`PlanError::Oracle`] when a travel cost is unavailable.
    /// - [`PlanError::InvalidTrip`] if a constructed trip fails evaluation.
    pub fn run(&self, registry: &mut DemandRegistry, fleet: &Fleet) -> Result<Plan, PlanError> {
        let mut plan = Plan::new();
        let total_demand: i64 = registry.remaining().map(|p| i64::from(p.demand())).sum();
        info!(
            "planning {} point(s), total demand {} for {} vehicle(s), capacity {} per round",
            registry.remaining_count(),
            total_demand,
            fleet.len(),
            fleet.total_capacity()
        );
        if total_demand > fleet.total_capacity() {
            warn!(
                "total demand {} exceeds fleet capacity {}; multiple rounds are needed",
                total_demand,
                fleet.total_capacity()
            );
        }

        let excluded = self.screen_unservable(registry, fleet, &mut plan)?;

        if self.config.prefetch_costs {
            let mut waypoints = vec![registry.depot().waypoint()];
            waypoints.extend(unserved(registry, &excluded).map(DemandPoint::waypoint));
            self.oracle.warm(&waypoints)?;
        }

        let mut round = 0;
        while unserved(registry, &excluded).next().is_some() {
            round += 1;
            let summary = self.run_round(round, registry, fleet, &excluded, &mut plan)?;
            if summary.points_served == 0 {
                let residual: Vec<usize> =
                    unserved(registry, &excluded).map(DemandPoint::id).collect();
                warn!(
                    "round {round} served nobody; {} point(s) cannot be planned",
                    residual.len()
                );
                return Err(PlanError::InfeasiblePlan {
                    rounds_completed: round - 1,
                    residual,
                });
            }
            debug!(
                "round {}: {} trip(s), {} point(s), {:.1} m",
                summary.round, summary.trips, summary.points_served, summary.distance
            );
            plan.add_round(summary);
        }

        let stats = self.oracle.stats();
        info!(
            "planned {} trip(s) over {} round(s), {:.1} m total; \
             cost cache {} hit(s), {} miss(es)",
            plan.num_trips(),
            plan.round_count(),
            plan.total_distance(),
            stats.hits,
            stats.misses
        );
        Ok(plan)
    }

    /// Handles points no vehicle can carry, before any trip is built.
    ///
    /// Returns the ids to leave out of planning.
    fn screen_unservable(
        &self,
        registry: &DemandRegistry,
        fleet: &Fleet,
        plan: &mut Plan,
    ) -> Result<BTreeSet<usize>, PlanError> {
        let mut excluded = BTreeSet::new();
        // An empty fleet is reported as infeasible by the first round instead.
        let Some(max_capacity) = fleet.max_capacity() else {
            return Ok(excluded);
        };

        for point in registry.remaining().filter(|p| p.demand() > max_capacity) {
            match self.config.unservable_policy {
                UnservablePolicy::Abort => {
                    return Err(PlanError::UnservableDemand {
                        point: point.id(),
                        demand: point.demand(),
                        max_capacity,
                    });
                }
                UnservablePolicy::SkipAndReport => {
                    warn!(
                        "skipping point {}: demand {} exceeds largest capacity {}",
                        point.id(),
                        point.demand(),
                        max_capacity
                    );
                    excluded.insert(point.id());
                    plan.add_skipped(point.id());
                }
            }
        }
        Ok(excluded)
    }

    fn run_round(
        &self,
        round: usize,
        registry: &mut DemandRegistry,
        fleet: &Fleet,
        excluded: &BTreeSet<usize>,
        plan: &mut Plan,
    ) -> Result<RoundSummary, PlanError> {
        let mut summary = RoundSummary {
            round,
            trips: 0,
            points_served: 0,
            distance: 0.0,
        };

        for vehicle in fleet.vehicles() {
            if unserved(registry, excluded).next().is_none() {
                break;
            }
            let Some(trip) = self.build_trip(round, registry, vehicle, excluded)? else {
                trace!("vehicle {} idle in round {round}", vehicle.id());
                continue;
            };

            let served = registry.mark_assigned(&trip.point_ids());
            summary.trips += 1;
            summary.points_served += served;
            summary.distance += trip.distance();
            debug!(
                "round {round} vehicle {}: {} stop(s), load {}/{}, {:.1} m",
                vehicle.id(),
                trip.len(),
                trip.load(),
                vehicle.capacity(),
                trip.distance()
            );
            plan.add_trip(trip);
        }

        Ok(summary)
    }

    /// Builds and improves one trip for `vehicle`, `None` if it has nothing
    /// it can carry.
    fn build_trip(
        &self,
        round: usize,
        registry: &DemandRegistry,
        vehicle: &Vehicle,
        excluded: &BTreeSet<usize>,
    ) -> Result<Option<Trip>, PlanError> {
        let candidates: Vec<&DemandPoint> = unserved(registry, excluded)
            .filter(|p| p.demand() <= vehicle.capacity())
            .collect();
        if candidates.is_empty() {
            return Ok(None);
        }

        let depot = registry.depot();
        let sequence = nearest_feasible_insertion(depot, &candidates, vehicle, self.oracle)?;
        let route: Vec<Waypoint> = sequence
            .iter()
            .filter_map(|&id| registry.point(id).map(DemandPoint::waypoint))
            .collect();
        let (improved, _) = two_opt_improve(
            &route,
            &depot.waypoint(),
            self.oracle,
            self.config.max_two_opt_passes,
        )?;
        let ids: Vec<usize> = improved.iter().filter_map(|w| w.id.point_id()).collect();

        let evaluator = TripEvaluator::new(registry, self.oracle, vehicle);
        let trip = evaluator.build_feasible_trip(&ids, round)?;
        Ok((!trip.is_empty()).then_some(trip))
    }
}

/// Unserved points still in play, in id order.
fn unserved<'r>(
    registry: &'r DemandRegistry,
    excluded: &'r BTreeSet<usize>,
) -> impl Iterator<Item = &'r DemandPoint> + 'r {
    registry.remaining().filter(move |p| !excluded.contains(&p.id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OracleError;
    use crate::models::{Depot, Location, Vehicle};
    use crate::oracle::{CostSymmetry, EuclideanProvider, TravelCost};
    use rstest::rstest;

    fn registry(demands: &[i32]) -> DemandRegistry {
        let depot = Depot::new(Location::new(0.0, 0.0));
        let points = demands
            .iter()
            .enumerate()
            .map(|(i, &d)| DemandPoint::new(i + 1, Location::new(0.0, (i + 1) as f64), d));
        DemandRegistry::register(depot, points).registry
    }

    fn oracle() -> DistanceOracle<EuclideanProvider> {
        DistanceOracle::new(EuclideanProvider, CostSymmetry::Symmetric)
    }

    #[test]
    fn test_single_trip_when_everything_fits() {
        let mut reg = registry(&[2, 3, 4]);
        let o = oracle();
        let config = PlannerConfig::default();
        let plan = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(1, 10))
            .expect("plan");
        assert_eq!(plan.num_trips(), 1);
        assert_eq!(plan.trips()[0].load(), 9);
        assert_eq!(plan.trips()[0].len(), 3);
        assert_eq!(plan.round_count(), 1);
        assert!(reg.is_complete());
    }

    #[test]
    fn test_vehicle_reused_across_rounds() {
        let mut reg = registry(&[8, 8]);
        let o = oracle();
        let config = PlannerConfig::default();
        let plan = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(1, 10))
            .expect("plan");
        assert_eq!(plan.num_trips(), 2);
        let rounds: Vec<usize> = plan.trips().iter().map(Trip::round).collect();
        assert_eq!(rounds, vec![1, 2]);
        assert!(plan.trips().iter().all(|t| t.len() == 1 && t.vehicle_id() == 0));
    }

    #[test]
    fn test_capacity_near_i32_max_splits_trips() {
        let mut reg = registry(&[i32::MAX - 1, 2]);
        let o = oracle();
        let config = PlannerConfig::default();
        let plan = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(1, i32::MAX))
            .expect("plan");
        assert_eq!(plan.num_trips(), 2);
        assert_eq!(plan.round_count(), 2);
        assert!(plan.trips().iter().all(|t| t.load() <= i64::from(i32::MAX)));
        assert_eq!(plan.total_load(), i64::from(i32::MAX) + 1);
    }

    #[test]
    fn test_two_vehicles_share_one_round() {
        let mut reg = registry(&[8, 8]);
        let o = oracle();
        let config = PlannerConfig::default();
        let plan = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(2, 10))
            .expect("plan");
        assert_eq!(plan.num_trips(), 2);
        assert_eq!(plan.round_count(), 1);
        assert_eq!(plan.rounds()[0].points_served, 2);
    }

    #[test]
    fn test_unservable_aborts_by_default() {
        let mut reg = registry(&[15]);
        let o = oracle();
        let config = PlannerConfig::default();
        let err = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(1, 10))
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::UnservableDemand {
                point: 1,
                demand: 15,
                max_capacity: 10
            }
        );
    }

    #[test]
    fn test_unservable_skipped_when_configured() {
        let mut reg = registry(&[15, 4]);
        let o = oracle();
        let config =
            PlannerConfig::default().with_unservable_policy(UnservablePolicy::SkipAndReport);
        let plan = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(1, 10))
            .expect("plan");
        assert_eq!(plan.skipped(), &[1]);
        assert_eq!(plan.served_point_ids(), vec![2]);
        assert_eq!(reg.remaining_ids(), vec![1]);
    }

    #[test]
    fn test_empty_fleet_is_infeasible() {
        let mut reg = registry(&[1, 2]);
        let o = oracle();
        let config = PlannerConfig::default();
        let err = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(0, 10))
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::InfeasiblePlan {
                rounds_completed: 0,
                residual: vec![1, 2]
            }
        );
    }

    #[test]
    fn test_no_points_no_rounds() {
        let mut reg = registry(&[]);
        let o = oracle();
        let config = PlannerConfig::default();
        let plan = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(0, 10))
            .expect("plan");
        assert_eq!(plan.num_trips(), 0);
        assert_eq!(plan.round_count(), 0);
    }

    #[test]
    fn test_heterogeneous_fleet_routes_heavy_point_to_big_vehicle() {
        let mut reg = registry(&[12, 3]);
        let fleet = Fleet::new(vec![Vehicle::new(0, 5), Vehicle::new(1, 20)]).expect("fleet");
        let o = oracle();
        let config = PlannerConfig::default();
        let plan = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &fleet)
            .expect("plan");
        for trip in plan.trips() {
            let cap = fleet.vehicle(trip.vehicle_id()).expect("vehicle").capacity();
            assert!(trip.load() <= i64::from(cap));
        }
        assert!(reg.is_complete());
        assert_eq!(plan.round_count(), 1);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_prefetch_does_not_change_plan(#[case] prefetch: bool) {
        let demands = [3, 5, 2, 7, 4, 6];
        let mut reg = registry(&demands);
        let o = oracle();
        let config = PlannerConfig::default().with_prefetch_costs(prefetch);
        let plan = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(2, 10))
            .expect("plan");

        let mut baseline_reg = registry(&demands);
        let baseline_oracle = oracle();
        let baseline_config = PlannerConfig::default();
        let baseline = MultiTripScheduler::new(&baseline_oracle, &baseline_config)
            .run(&mut baseline_reg, &Fleet::uniform(2, 10))
            .expect("plan");
        assert_eq!(plan, baseline);
    }

    #[test]
    fn test_oracle_failure_aborts() {
        struct Down;
        impl TravelCostProvider for Down {
            fn query_cost(&self, o: &Waypoint, d: &Waypoint) -> Result<TravelCost, OracleError> {
                Err(OracleError::Unavailable {
                    origin: o.id,
                    destination: d.id,
                    reason: "no route".to_string(),
                })
            }
        }
        let mut reg = registry(&[1]);
        let o = DistanceOracle::new(Down, CostSymmetry::Symmetric);
        let config = PlannerConfig::default();
        let err = MultiTripScheduler::new(&o, &config)
            .run(&mut reg, &Fleet::uniform(1, 10))
            .unwrap_err();
        assert!(matches!(err, PlanError::Oracle(_)));
        assert!(!reg.is_complete());
    }
}
