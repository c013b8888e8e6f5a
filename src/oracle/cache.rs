//! Memoising adapter over a travel-cost provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use log::trace;
use serde::{Deserialize, Serialize};

use super::provider::{TravelCost, TravelCostProvider};
use crate::error::OracleError;
use crate::models::{SiteId, Waypoint};

/// Whether `cost(a, b)` may be assumed equal to `cost(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostSymmetry {
    /// Cache keyed by the unordered pair; one provider query per pair.
    #[default]
    Symmetric,
    /// Cache keyed by the ordered pair.
    Asymmetric,
}

impl CostSymmetry {
    fn key(self, a: SiteId, b: SiteId) -> (SiteId, SiteId) {
        match self {
            CostSymmetry::Symmetric if b < a => (b, a),
            _ => (a, b),
        }
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: usize,
    /// Lookups forwarded to the provider.
    pub misses: usize,
    /// Cached legs.
    pub entries: usize,
}

/// Serves travel costs, querying the provider at most once per key.
///
/// Entries are never invalidated; costs are assumed static for the run and
/// the cache is dropped with the oracle. Safe to share between threads when
/// the provider is: reads take a shared lock, and a racing insert for the
/// same key stores the same value.
///
/// # Examples
///
/// ```
/// use u_dispatch::models::{DemandPoint, Depot, Location};
/// use u_dispatch::oracle::{CostSymmetry, DistanceOracle, EuclideanProvider};
///
/// let depot = Depot::new(Location::new(0.0, 0.0));
/// let p = DemandPoint::new(1, Location::new(3.0, 4.0), 1);
/// let oracle = DistanceOracle::new(EuclideanProvider, CostSymmetry::Symmetric);
///
/// let there = oracle.cost(&depot.waypoint(), &p.waypoint())?;
/// let back = oracle.cost(&p.waypoint(), &depot.waypoint())?;
/// assert_eq!(there, back);
/// assert_eq!(oracle.stats().misses, 1);
/// assert_eq!(oracle.stats().hits, 1);
/// # Ok::<(), u_dispatch::error::OracleError>(())
/// ```
#[derive(Debug)]
pub struct DistanceOracle<P> {
    provider: P,
    symmetry: CostSymmetry,
    cache: RwLock<HashMap<(SiteId, SiteId), TravelCost>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<P: TravelCostProvider> DistanceOracle<P> {
    /// Wraps `provider` with an empty cache.
    pub fn new(provider: P, symmetry: CostSymmetry) -> Self {
        Self {
            provider,
            symmetry,
            cache: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Key symmetry in use.
    pub fn symmetry(&self) -> CostSymmetry {
        self.symmetry
    }

    /// Travel cost from `from` to `to`.
    ///
    /// A site to itself costs nothing and never reaches the provider.
    pub fn cost(&self, from: &Waypoint, to: &Waypoint) -> Result<TravelCost, OracleError> {
        if from.id == to.id {
            return Ok(TravelCost::ZERO);
        }
        let key = self.symmetry.key(from.id, to.id);
        if let Some(cost) = self.lookup(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cost);
        }

        // Query in key orientation so the cached value does not depend on
        // which direction was asked first.
        let (origin, destination) = if key.0 == from.id { (from, to) } else { (to, from) };
        trace!("cache miss {} -> {}", origin.id, destination.id);
        self.misses.fetch_add(1, Ordering::Relaxed);
        let cost = self.provider.query_cost(origin, destination)?;
        if !cost.is_valid() {
            return Err(OracleError::InvalidCost {
                origin: origin.id,
                destination: destination.id,
            });
        }
        self.store(key, cost);
        Ok(cost)
    }

    /// Travel distance from `from` to `to`, in metres.
    pub fn distance(&self, from: &Waypoint, to: &Waypoint) -> Result<f64, OracleError> {
        Ok(self.cost(from, to)?.distance)
    }

    /// Fills the cache for every pair of `waypoints` with one table query.
    ///
    /// Keys already cached keep their value. The table is checked in full
    /// before anything is stored, so a failed warm-up leaves the cache as it
    /// was.
    pub fn warm(&self, waypoints: &[Waypoint]) -> Result<(), OracleError> {
        if waypoints.len() < 2 {
            return Ok(());
        }
        let n = waypoints.len();
        let table = self.provider.query_table(waypoints)?;
        if table.len() != n || table.iter().any(|row| row.len() != n) {
            return Err(OracleError::MalformedTable { expected: n });
        }

        let mut entries = Vec::with_capacity(n * (n - 1));
        for (from, row) in waypoints.iter().zip(&table) {
            for (to, cost) in waypoints.iter().zip(row) {
                if from.id == to.id {
                    continue;
                }
                let key = self.symmetry.key(from.id, to.id);
                if key.0 != from.id {
                    continue;
                }
                if !cost.is_valid() {
                    return Err(OracleError::InvalidCost {
                        origin: from.id,
                        destination: to.id,
                    });
                }
                entries.push((key, *cost));
            }
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        for (key, cost) in entries {
            cache.entry(key).or_insert(cost);
        }
        Ok(())
    }

    /// Number of cached legs.
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current cache counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn lookup(&self, key: (SiteId, SiteId)) -> Option<TravelCost> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .copied()
    }

    fn store(&self, key: (SiteId, SiteId), cost: TravelCost) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, cost);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use crate::oracle::{EuclideanProvider, TravelCostTable};
    use rstest::rstest;
    use std::cell::Cell;

    /// Direction-dependent provider: going "up" in id costs double.
    struct Skewed {
        calls: Cell<usize>,
    }

    impl TravelCostProvider for Skewed {
        fn query_cost(&self, o: &Waypoint, d: &Waypoint) -> Result<TravelCost, OracleError> {
            self.calls.set(self.calls.get() + 1);
            let base = EuclideanProvider.query_cost(o, d)?;
            let factor = if o.id < d.id { 2.0 } else { 1.0 };
            Ok(TravelCost::new(base.distance * factor, base.duration * factor))
        }
    }

    struct Down;

    impl TravelCostProvider for Down {
        fn query_cost(&self, o: &Waypoint, d: &Waypoint) -> Result<TravelCost, OracleError> {
            Err(OracleError::Unavailable {
                origin: o.id,
                destination: d.id,
                reason: "service down".to_string(),
            })
        }
    }

    struct Negative;

    impl TravelCostProvider for Negative {
        fn query_cost(&self, _: &Waypoint, _: &Waypoint) -> Result<TravelCost, OracleError> {
            Ok(TravelCost::new(-1.0, 1.0))
        }
    }

    /// Table endpoint returning `rows` rows, with an optional bad cell.
    struct Table {
        rows: usize,
        bad_cell: Option<(usize, usize)>,
    }

    impl TravelCostProvider for Table {
        fn query_cost(&self, o: &Waypoint, d: &Waypoint) -> Result<TravelCost, OracleError> {
            EuclideanProvider.query_cost(o, d)
        }

        fn query_table(&self, waypoints: &[Waypoint]) -> Result<TravelCostTable, OracleError> {
            let mut table = EuclideanProvider.query_table(waypoints)?;
            table.truncate(self.rows);
            if let Some((i, j)) = self.bad_cell {
                table[i][j] = TravelCost::new(f64::NAN, 1.0);
            }
            Ok(table)
        }
    }

    fn wp(id: SiteId, lat: f64, lon: f64) -> Waypoint {
        Waypoint {
            id,
            location: Location::new(lat, lon),
        }
    }

    #[test]
    fn test_self_cost_is_zero_without_query() {
        let provider = Skewed { calls: Cell::new(0) };
        let oracle = DistanceOracle::new(&provider, CostSymmetry::Symmetric);
        let a = wp(SiteId::Point(1), 1.0, 1.0);
        assert_eq!(oracle.cost(&a, &a).expect("cost"), TravelCost::ZERO);
        assert_eq!(provider.calls.get(), 0);
    }

    #[rstest]
    #[case(CostSymmetry::Symmetric, 1, 2.0, 2.0)]
    #[case(CostSymmetry::Asymmetric, 2, 2.0, 1.0)]
    fn test_symmetry_keys(
        #[case] symmetry: CostSymmetry,
        #[case] expected_calls: usize,
        #[case] forward: f64,
        #[case] backward: f64,
    ) {
        let provider = Skewed { calls: Cell::new(0) };
        let oracle = DistanceOracle::new(&provider, symmetry);
        let a = wp(SiteId::Point(1), 0.0, 0.0);
        let b = wp(SiteId::Point(2), 0.0, 1.0);

        // Ask in the "down" direction first; symmetric mode still queries up.
        let back = oracle.distance(&b, &a).expect("cost");
        let fwd = oracle.distance(&a, &b).expect("cost");
        assert_eq!(fwd, forward);
        assert_eq!(back, backward);
        assert_eq!(provider.calls.get(), expected_calls);
        assert_eq!(oracle.len(), expected_calls);
    }

    #[test]
    fn test_repeat_queries_hit_cache() {
        let provider = Skewed { calls: Cell::new(0) };
        let oracle = DistanceOracle::new(&provider, CostSymmetry::Symmetric);
        let a = wp(SiteId::Depot, 0.0, 0.0);
        let b = wp(SiteId::Point(1), 0.0, 1.0);
        for _ in 0..5 {
            oracle.cost(&a, &b).expect("cost");
        }
        assert_eq!(provider.calls.get(), 1);
        let stats = oracle.stats();
        assert_eq!(stats.hits, 4);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_unavailable_propagates() {
        let oracle = DistanceOracle::new(Down, CostSymmetry::Symmetric);
        let a = wp(SiteId::Depot, 0.0, 0.0);
        let b = wp(SiteId::Point(1), 0.0, 1.0);
        let err = oracle.cost(&a, &b).unwrap_err();
        assert!(matches!(err, OracleError::Unavailable { .. }));
        assert!(oracle.is_empty());
    }

    #[test]
    fn test_invalid_cost_rejected() {
        let oracle = DistanceOracle::new(Negative, CostSymmetry::Symmetric);
        let a = wp(SiteId::Depot, 0.0, 0.0);
        let b = wp(SiteId::Point(1), 0.0, 1.0);
        let err = oracle.cost(&a, &b).unwrap_err();
        assert_eq!(
            err,
            OracleError::InvalidCost {
                origin: SiteId::Depot,
                destination: SiteId::Point(1)
            }
        );
    }

    #[test]
    fn test_warm_fills_all_pairs() {
        let provider = Skewed { calls: Cell::new(0) };
        let oracle = DistanceOracle::new(&provider, CostSymmetry::Symmetric);
        let pts = vec![
            wp(SiteId::Depot, 0.0, 0.0),
            wp(SiteId::Point(1), 0.0, 1.0),
            wp(SiteId::Point(2), 1.0, 0.0),
        ];
        oracle.warm(&pts).expect("warm");
        assert_eq!(oracle.len(), 3);
        let calls_after_warm = provider.calls.get();
        oracle.cost(&pts[2], &pts[1]).expect("cost");
        assert_eq!(provider.calls.get(), calls_after_warm);
    }

    fn triangle() -> Vec<Waypoint> {
        vec![
            wp(SiteId::Depot, 0.0, 0.0),
            wp(SiteId::Point(1), 0.0, 1.0),
            wp(SiteId::Point(2), 1.0, 0.0),
        ]
    }

    #[test]
    fn test_warm_rejects_short_table() {
        let oracle = DistanceOracle::new(
            Table {
                rows: 2,
                bad_cell: None,
            },
            CostSymmetry::Symmetric,
        );
        let err = oracle.warm(&triangle()).unwrap_err();
        assert_eq!(err, OracleError::MalformedTable { expected: 3 });
        assert!(oracle.is_empty());
    }

    #[test]
    fn test_warm_invalid_cell_leaves_cache_untouched() {
        // Cells (0,1) and (0,2) are valid and scanned before (1,2).
        let oracle = DistanceOracle::new(
            Table {
                rows: 3,
                bad_cell: Some((1, 2)),
            },
            CostSymmetry::Symmetric,
        );
        let err = oracle.warm(&triangle()).unwrap_err();
        assert_eq!(
            err,
            OracleError::InvalidCost {
                origin: SiteId::Point(1),
                destination: SiteId::Point(2)
            }
        );
        assert!(oracle.is_empty());
    }

    #[test]
    fn test_warm_keeps_existing_entries() {
        let oracle = DistanceOracle::new(
            Table {
                rows: 3,
                bad_cell: None,
            },
            CostSymmetry::Symmetric,
        );
        let pts = triangle();
        let before = oracle.cost(&pts[0], &pts[1]).expect("cost");
        oracle.warm(&pts).expect("warm");
        assert_eq!(oracle.len(), 3);
        assert_eq!(oracle.cost(&pts[1], &pts[0]).expect("cost"), before);
    }

    #[test]
    fn test_warm_propagates_failure() {
        let oracle = DistanceOracle::new(Down, CostSymmetry::Asymmetric);
        let pts = vec![wp(SiteId::Depot, 0.0, 0.0), wp(SiteId::Point(1), 0.0, 1.0)];
        assert!(oracle.warm(&pts).is_err());
    }
}
