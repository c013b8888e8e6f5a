//! Intra-trip 2-opt improvement.
//!
//! # Algorithm
//!
//! Treat the trip as the closed tour `depot → r[0] → … → r[n-1] → depot`.
//! For each pair of non-adjacent edges (a→b) and (c→d), reversing the path
//! `b … c` changes the distance by
//!
//! ```text
//! delta = d(a, c) + d(b, d) - d(a, b) - d(c, d)   (+ internal change if asymmetric)
//! ```
//!
//! Each pass applies the single best improving move. Stops when a pass finds
//! none (2-opt local optimum) or the pass budget runs out.
//!
//! # Complexity
//!
//! O(n²) per pass for symmetric costs, O(n³) for asymmetric.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use log::trace;

use crate::error::OracleError;
use crate::models::Waypoint;
use crate::oracle::{CostSymmetry, DistanceOracle, TravelCostProvider};

/// Moves must save more than this to be applied.
const IMPROVE_EPS: f64 = 1e-9;

/// Applies 2-opt improvement to one trip's visiting order.
///
/// `route` excludes the depot, which is implicit at both ends. Returns the
/// improved order (same members) and its total distance. The result is
/// never longer than the input.
///
/// # Examples
///
/// ```
/// use u_dispatch::local_search::{route_distance, two_opt_improve};
/// use u_dispatch::models::{DemandPoint, Depot, Location};
/// use u_dispatch::oracle::{CostSymmetry, DistanceOracle, EuclideanProvider};
///
/// let depot = Depot::new(Location::new(0.0, 0.0)).waypoint();
/// let wp = |id, lat, lon| DemandPoint::new(id, Location::new(lat, lon), 1).waypoint();
/// // Square visited in a crossing order.
/// let route = vec![wp(1, 0.0, 1.0), wp(2, 1.0, 0.0), wp(3, 1.0, 1.0)];
/// let oracle = DistanceOracle::new(EuclideanProvider, CostSymmetry::Symmetric);
///
/// let before = route_distance(&route, &depot, &oracle)?;
/// let (improved, after) = two_opt_improve(&route, &depot, &oracle, 100)?;
/// assert!(after < before);
/// assert!((after - 4.0).abs() < 1e-10);
/// assert_eq!(improved.len(), 3);
/// # Ok::<(), u_dispatch::error::OracleError>(())
/// ```
pub fn two_opt_improve<P: TravelCostProvider>(
    route: &[Waypoint],
    depot: &Waypoint,
    oracle: &DistanceOracle<P>,
    max_passes: usize,
) -> Result<(Vec<Waypoint>, f64), OracleError> {
    let initial = route_distance(route, depot, oracle)?;
    if route.len() < 2 {
        return Ok((route.to_vec(), initial));
    }

    let mut current = route.to_vec();
    let n = current.len();

    for pass in 0..max_passes {
        let mut best: Option<(usize, usize, f64)> = None;

        // Edge k joins tour node k to node k+1, where node 0 and node n+1
        // are the depot and node k is current[k-1].
        for i in 0..n {
            for j in i + 2..=n {
                let delta = two_opt_delta(&current, depot, oracle, i, j)?;
                if delta < -IMPROVE_EPS && best.map_or(true, |(_, _, b)| delta < b) {
                    best = Some((i, j, delta));
                }
            }
        }

        let Some((i, j, delta)) = best else { break };
        trace!("2-opt pass {pass}: reverse positions {i}..{j}, delta {delta:.3}");
        current[i..j].reverse();
    }

    let improved = route_distance(&current, depot, oracle)?;
    if improved > initial {
        return Ok((route.to_vec(), initial));
    }
    Ok((current, improved))
}

/// Computes the distance change from reversing tour nodes `i+1..=j`.
///
/// Before: ... - a - b - ... - c - d - ...
/// After:  ... - a - c - ... - b - d - ...
fn two_opt_delta<P: TravelCostProvider>(
    route: &[Waypoint],
    depot: &Waypoint,
    oracle: &DistanceOracle<P>,
    i: usize,
    j: usize,
) -> Result<f64, OracleError> {
    let node = |k: usize| tour_node(route, depot, k);
    let (a, b, c, d) = (node(i), node(i + 1), node(j), node(j + 1));

    let old_cost = oracle.distance(a, b)? + oracle.distance(c, d)?;
    let new_cost = oracle.distance(a, c)? + oracle.distance(b, d)?;
    let mut delta = new_cost - old_cost;

    if oracle.symmetry() == CostSymmetry::Asymmetric {
        for k in i + 1..j {
            delta +=
                oracle.distance(node(k + 1), node(k))? - oracle.distance(node(k), node(k + 1))?;
        }
    }

    Ok(delta)
}

/// Node `k` of the closed tour: the depot at both ends, `route[k-1]` between.
fn tour_node<'a>(route: &'a [Waypoint], depot: &'a Waypoint, k: usize) -> &'a Waypoint {
    if k == 0 || k > route.len() {
        depot
    } else {
        &route[k - 1]
    }
}

/// Total distance of `depot → route[0] → … → route[n-1] → depot`.
pub fn route_distance<P: TravelCostProvider>(
    route: &[Waypoint],
    depot: &Waypoint,
    oracle: &DistanceOracle<P>,
) -> Result<f64, OracleError> {
    let mut dist = 0.0;
    let mut prev = depot;
    for wp in route {
        dist += oracle.distance(prev, wp)?;
        prev = wp;
    }
    dist += oracle.distance(prev, depot)?;
    Ok(dist)
}
