//! Validated demand points and their served/unserved state.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::error::InvalidDemandError;
use crate::models::{DemandPoint, Depot};

/// Outcome of registering raw demand points.
///
/// Invalid records do not stop registration; they are returned here so the
/// caller can report them in aggregate.
#[derive(Debug, Clone)]
pub struct Registration {
    /// Registry holding every accepted point.
    pub registry: DemandRegistry,
    /// Records that were rejected, in input order.
    pub rejects: Vec<InvalidDemandError>,
}

/// Canonical set of the depot and validated customers for one run.
///
/// Points are kept in id order. [`DemandRegistry::mark_assigned`] is the
/// only way to shrink the unserved set.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{DemandPoint, Depot, Location};
/// use u_dispatch::registry::DemandRegistry;
///
/// let depot = Depot::new(Location::new(12.9716, 77.5946));
/// let points = vec![
///     DemandPoint::new(1, Location::new(12.95, 77.60), 3),
///     DemandPoint::new(2, Location::new(12.99, 77.57), 0), // rejected
/// ];
/// let mut reg = DemandRegistry::register(depot, points);
/// assert_eq!(reg.registry.len(), 1);
/// assert_eq!(reg.rejects.len(), 1);
///
/// reg.registry.mark_assigned(&[1]);
/// assert!(reg.registry.is_complete());
/// ```
#[derive(Debug, Clone)]
pub struct DemandRegistry {
    depot: Depot,
    points: BTreeMap<usize, DemandPoint>,
    remaining: BTreeSet<usize>,
}

impl DemandRegistry {
    /// Validates `points` and builds a registry from the accepted ones.
    ///
    /// A point is rejected if its demand is not positive, its coordinate is
    /// not finite, or its id was already accepted.
    pub fn register<I>(depot: Depot, points: I) -> Registration
    where
        I: IntoIterator<Item = DemandPoint>,
    {
        let mut accepted = BTreeMap::new();
        let mut rejects = Vec::new();

        for point in points {
            let id = point.id();
            let verdict = if point.demand() <= 0 {
                Err(InvalidDemandError::NonPositiveDemand {
                    id,
                    demand: point.demand(),
                })
            } else if !point.location().is_finite() {
                Err(InvalidDemandError::NonFiniteCoordinate { id })
            } else if accepted.contains_key(&id) {
                Err(InvalidDemandError::DuplicateId { id })
            } else {
                Ok(())
            };

            match verdict {
                Ok(()) => {
                    accepted.insert(id, point);
                }
                Err(e) => {
                    warn!("rejecting demand record: {e}");
                    rejects.push(e);
                }
            }
        }

        let remaining = accepted.keys().copied().collect();
        Registration {
            registry: Self {
                depot,
                points: accepted,
                remaining,
            },
            rejects,
        }
    }

    /// The depot.
    pub fn depot(&self) -> &Depot {
        &self.depot
    }

    /// Looks up an accepted point.
    pub fn point(&self, id: usize) -> Option<&DemandPoint> {
        self.points.get(&id)
    }

    /// All accepted points in id order.
    pub fn points(&self) -> impl Iterator<Item = &DemandPoint> {
        self.points.values()
    }

    /// Number of accepted points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if no point was accepted.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points not yet assigned to any trip, in id order.
    pub fn remaining(&self) -> impl Iterator<Item = &DemandPoint> {
        self.remaining.iter().filter_map(|id| self.points.get(id))
    }

    /// Ids of the points not yet assigned, in id order.
    pub fn remaining_ids(&self) -> Vec<usize> {
        self.remaining.iter().copied().collect()
    }

    /// Number of points not yet assigned.
    pub fn remaining_count(&self) -> usize {
        self.remaining.len()
    }

    /// Returns `true` once every point has been assigned.
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Removes `ids` from the unserved set.
    ///
    /// Returns how many of them were still unserved.
    pub fn mark_assigned(&mut self, ids: &[usize]) -> usize {
        ids.iter().filter(|&&id| self.remaining.remove(&id)).count()
    }

    /// Sum of all accepted demand.
    pub fn total_demand(&self) -> i64 {
        self.points.values().map(|p| i64::from(p.demand())).sum()
    }
}
