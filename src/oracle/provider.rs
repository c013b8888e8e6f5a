//! Travel-cost providers.
//!
//! A provider answers point-to-point travel cost queries. Real deployments
//! put a routing service behind [`TravelCostProvider`]; the two built-in
//! providers compute costs from coordinates alone.

use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::models::Waypoint;

/// Distance and duration of one directed leg.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TravelCost {
    /// Distance in metres.
    pub distance: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl TravelCost {
    /// Zero-length leg.
    pub const ZERO: Self = Self {
        distance: 0.0,
        duration: 0.0,
    };

    /// Creates a travel cost.
    pub fn new(distance: f64, duration: f64) -> Self {
        Self { distance, duration }
    }

    /// Returns `true` if both components are finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.distance.is_finite()
            && self.duration.is_finite()
            && self.distance >= 0.0
            && self.duration >= 0.0
    }
}

/// Square table of travel costs; `table[i][j]` is the leg from `i` to `j`.
pub type TravelCostTable = Vec<Vec<TravelCost>>;

/// Source of travel costs between two waypoints.
///
/// Calls are synchronous. A provider that cannot answer must return
/// [`OracleError::Unavailable`]; callers do not retry.
///
/// # Examples
///
/// ```
/// use u_dispatch::error::OracleError;
/// use u_dispatch::models::{Location, SiteId, Waypoint};
/// use u_dispatch::oracle::{TravelCost, TravelCostProvider};
///
/// struct FlatRate;
///
/// impl TravelCostProvider for FlatRate {
///     fn query_cost(&self, _: &Waypoint, _: &Waypoint) -> Result<TravelCost, OracleError> {
///         Ok(TravelCost::new(1000.0, 120.0))
///     }
/// }
///
/// let a = Waypoint { id: SiteId::Depot, location: Location::new(0.0, 0.0) };
/// let b = Waypoint { id: SiteId::Point(1), location: Location::new(0.0, 1.0) };
/// assert_eq!(FlatRate.query_cost(&a, &b)?.distance, 1000.0);
/// # Ok::<(), OracleError>(())
/// ```
pub trait TravelCostProvider {
    /// Travel cost from `origin` to `destination`.
    fn query_cost(
        &self,
        origin: &Waypoint,
        destination: &Waypoint,
    ) -> Result<TravelCost, OracleError>;

    /// Travel costs between every pair of `waypoints`.
    ///
    /// The default issues one [`query_cost`](Self::query_cost) per ordered
    /// pair. Providers backed by a table endpoint should override it.
    fn query_table(&self, waypoints: &[Waypoint]) -> Result<TravelCostTable, OracleError> {
        waypoints
            .iter()
            .map(|from| {
                waypoints
                    .iter()
                    .map(|to| {
                        if from.id == to.id {
                            Ok(TravelCost::ZERO)
                        } else {
                            self.query_cost(from, to)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

impl<T: TravelCostProvider + ?Sized> TravelCostProvider for &T {
    fn query_cost(
        &self,
        origin: &Waypoint,
        destination: &Waypoint,
    ) -> Result<TravelCost, OracleError> {
        (**self).query_cost(origin, destination)
    }

    fn query_table(&self, waypoints: &[Waypoint]) -> Result<TravelCostTable, OracleError> {
        (**self).query_table(waypoints)
    }
}

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle provider for running without a routing service.
///
/// Distance follows the haversine formula; duration assumes a constant
/// speed. Symmetric by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HaversineProvider {
    speed_mps: f64,
}

impl HaversineProvider {
    /// Creates a provider travelling at `speed_mps` metres per second.
    pub fn new(speed_mps: f64) -> Self {
        Self { speed_mps }
    }

    /// Assumed travel speed in metres per second.
    pub fn speed_mps(&self) -> f64 {
        self.speed_mps
    }
}

impl Default for HaversineProvider {
    /// 30 km/h, a typical urban delivery average.
    fn default() -> Self {
        Self::new(30.0 / 3.6)
    }
}

impl TravelCostProvider for HaversineProvider {
    fn query_cost(
        &self,
        origin: &Waypoint,
        destination: &Waypoint,
    ) -> Result<TravelCost, OracleError> {
        let (lat1, lon1) = (
            origin.location.latitude().to_radians(),
            origin.location.longitude().to_radians(),
        );
        let (lat2, lon2) = (
            destination.location.latitude().to_radians(),
            destination.location.longitude().to_radians(),
        );
        let d_lat = lat2 - lat1;
        let d_lon = lon2 - lon1;

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        let distance = EARTH_RADIUS_M * c;

        if self.speed_mps <= 0.0 || !self.speed_mps.is_finite() {
            return Err(OracleError::Unavailable {
                origin: origin.id,
                destination: destination.id,
                reason: format!("invalid speed {}", self.speed_mps),
            });
        }
        Ok(TravelCost::new(distance, distance / self.speed_mps))
    }
}

/// Planar provider treating longitude as `x` and latitude as `y`.
///
/// Distance is the Euclidean norm and duration equals distance (unit
/// speed). Intended for synthetic instances and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EuclideanProvider;

impl TravelCostProvider for EuclideanProvider {
    fn query_cost(
        &self,
        origin: &Waypoint,
        destination: &Waypoint,
    ) -> Result<TravelCost, OracleError> {
        let dx = origin.location.longitude() - destination.location.longitude();
        let dy = origin.location.latitude() - destination.location.latitude();
        let d = (dx * dx + dy * dy).sqrt();
        Ok(TravelCost::new(d, d))
    }
}
