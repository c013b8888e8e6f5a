//! Nearest-feasible-insertion trip construction.
//!
//! Builds one trip for one vehicle: starting from an empty depot-to-depot
//! tour, repeatedly insert the unplaced point whose cheapest insertion
//! position adds the least distance, skipping points that would overflow the
//! vehicle. Stops when nothing else fits.
//!
//! # Complexity
//!
//! O(n² × k) oracle lookups, n = candidates, k = trip length.
//!
//! # Reference
//!
//! Rosenkrantz, D.J., Stearns, R.E., Lewis, P.M. (1977). "An Analysis of
//! Several Heuristics for the Traveling Salesman Problem", *SIAM J. Comput.*
//! 6(3), 563-581.

use log::debug;

use crate::error::PlanError;
use crate::models::{DemandPoint, Depot, Vehicle, Waypoint};
use crate::oracle::{DistanceOracle, TravelCostProvider};

/// Marginal costs closer than this are treated as equal.
const TIE_EPS: f64 = 1e-9;

/// A candidate placement: point, position in the sequence, added distance.
#[derive(Debug, Clone, Copy)]
struct Insertion {
    candidate: usize,
    position: usize,
    delta: f64,
}

/// Builds a single capacity-feasible trip sequence from `candidates`.
///
/// Returns point ids in visiting order. Ties in marginal cost go to the
/// lowest point id, then to the earliest position, so the result depends
/// only on the inputs.
///
/// # Errors
///
/// - [`PlanError::UnservableDemand`] if `candidates` is non-empty but not a
///   single point fits the empty vehicle.
/// - [`PlanError::Oracle`] if a travel cost cannot be obtained.
///
/// # Examples
///
/// ```
/// use u_dispatch::constructive::nearest_feasible_insertion;
/// use u_dispatch::models::{DemandPoint, Depot, Location, Vehicle};
/// use u_dispatch::oracle::{CostSymmetry, DistanceOracle, EuclideanProvider};
///
/// let depot = Depot::new(Location::new(0.0, 0.0));
/// let points = vec![
///     DemandPoint::new(1, Location::new(0.0, 1.0), 10),
///     DemandPoint::new(2, Location::new(0.0, 2.0), 10),
///     DemandPoint::new(3, Location::new(0.0, 3.0), 10),
/// ];
/// let candidates: Vec<&DemandPoint> = points.iter().collect();
/// let oracle = DistanceOracle::new(EuclideanProvider, CostSymmetry::Symmetric);
///
/// let seq = nearest_feasible_insertion(&depot, &candidates, &Vehicle::new(0, 20), &oracle)?;
/// assert_eq!(seq.len(), 2);
/// # Ok::<(), u_dispatch::error::PlanError>(())
/// ```
pub fn nearest_feasible_insertion<P: TravelCostProvider>(
    depot: &Depot,
    candidates: &[&DemandPoint],
    vehicle: &Vehicle,
    oracle: &DistanceOracle<P>,
) -> Result<Vec<usize>, PlanError> {
    let mut pool: Vec<&DemandPoint> = candidates.to_vec();
    pool.sort_by_key(|p| p.id());

    let depot_wp = depot.waypoint();
    let mut route: Vec<Waypoint> = Vec::new();
    let mut sequence: Vec<usize> = Vec::new();
    let mut placed = vec![false; pool.len()];
    let mut load: i32 = 0;

    loop {
        let mut best: Option<Insertion> = None;

        for (idx, point) in pool.iter().enumerate() {
            // load never exceeds capacity, so the subtraction cannot overflow.
            if placed[idx] || point.demand() > vehicle.capacity() - load {
                continue;
            }
            let (position, delta) =
                cheapest_position(&depot_wp, &route, &point.waypoint(), oracle)?;
            // Pool is in id order, so a strict improvement keeps the lowest id on ties.
            let better = match best {
                None => true,
                Some(b) => delta < b.delta - TIE_EPS,
            };
            if better {
                best = Some(Insertion {
                    candidate: idx,
                    position,
                    delta,
                });
            }
        }

        let Some(chosen) = best else { break };
        let point = pool[chosen.candidate];
        placed[chosen.candidate] = true;
        load += point.demand();
        route.insert(chosen.position, point.waypoint());
        sequence.insert(chosen.position, point.id());
    }

    if sequence.is_empty() {
        // Nothing fits an empty vehicle, so every candidate is too heavy.
        if let Some(first) = pool.first() {
            return Err(PlanError::UnservableDemand {
                point: first.id(),
                demand: first.demand(),
                max_capacity: vehicle.capacity(),
            });
        }
    }

    debug!(
        "vehicle {}: built sequence {:?} with load {}/{}",
        vehicle.id(),
        sequence,
        load,
        vehicle.capacity()
    );
    Ok(sequence)
}

/// Cheapest position to insert `point` into `route` (depot implicit at both
/// ends) and the distance it adds. Earliest position wins ties.
fn cheapest_position<P: TravelCostProvider>(
    depot: &Waypoint,
    route: &[Waypoint],
    point: &Waypoint,
    oracle: &DistanceOracle<P>,
) -> Result<(usize, f64), PlanError> {
    let mut best_pos = 0;
    let mut best_delta = f64::INFINITY;

    for pos in 0..=route.len() {
        let prev = if pos == 0 { depot } else { &route[pos - 1] };
        let next = route.get(pos).unwrap_or(depot);
        let delta = oracle.distance(prev, point)? + oracle.distance(point, next)?
            - oracle.distance(prev, next)?;
        if delta < best_delta - TIE_EPS {
            best_pos = pos;
            best_delta = delta;
        }
    }

    Ok((best_pos, best_delta))
}
