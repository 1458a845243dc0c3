//! Waypoint routes and their generator.

use fleet_core::{GeoPoint, SimRng};

/// Number of waypoints in every generated route.
pub const ROUTE_WAYPOINTS: usize = 3;

/// An ordered loop of waypoints.  Never empty when produced by
/// [`RouteGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub waypoints: Vec<GeoPoint>,
}

impl Route {
    #[inline]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// The waypoint after `index`, wrapping at the end of the loop.
    #[inline]
    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.waypoints.len()
    }
}

/// A route plus the cursor the simulator moves along it.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverRoute {
    pub route:       Route,
    /// Index of the waypoint the driver is currently leaving.
    pub route_index: usize,
}

impl DriverRoute {
    pub fn new(route: Route) -> Self {
        Self { route, route_index: 0 }
    }

    /// `(current, next)` waypoints around the cursor.
    pub fn segment(&self) -> (GeoPoint, GeoPoint) {
        let current = self.route.waypoints[self.route_index];
        let next    = self.route.waypoints[self.route.next_index(self.route_index)];
        (current, next)
    }

    /// Move the cursor to the next waypoint, wrapping.
    pub fn advance(&mut self) {
        self.route_index = self.route.next_index(self.route_index);
    }
}

/// Produces short synthetic routes around a base location.
#[derive(Debug, Clone, Copy)]
pub struct RouteGenerator {
    /// Half-width, in degrees, of the offset applied to each waypoint.
    pub spread_deg: f64,
}

impl Default for RouteGenerator {
    fn default() -> Self {
        Self { spread_deg: 0.005 }
    }
}

impl RouteGenerator {
    pub fn new(spread_deg: f64) -> Self {
        Self { spread_deg }
    }

    /// [`ROUTE_WAYPOINTS`] waypoints, each independently offset from `base` by
    /// a uniform perturbation in `[-spread, +spread]` on both axes.
    pub fn generate(&self, base: GeoPoint, rng: &mut SimRng) -> Route {
        let waypoints = (0..ROUTE_WAYPOINTS)
            .map(|_| {
                let d_lat = rng.symmetric(self.spread_deg);
                let d_lon = rng.symmetric(self.spread_deg);
                base.offset(d_lat, d_lon)
            })
            .collect();
        Route { waypoints }
    }
}
