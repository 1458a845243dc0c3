//! Persistent random-walk movement for delivering drivers.

use std::f64::consts::TAU;

use fleet_core::{GeoPoint, SimRng};

use crate::Driver;

/// Projects a driver's next position from its recent heading.
///
/// With two or more history points the heading is the direction of the last
/// step, perturbed by up to `turn_rad` either way.  With fewer, a uniformly
/// random heading is used.  Step length is uniform in
/// `[min_step_deg, max_step_deg]` and is applied in `(lng, lat)` space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementModel {
    pub turn_rad:     f64,
    pub min_step_deg: f64,
    pub max_step_deg: f64,
}

impl Default for MovementModel {
    fn default() -> Self {
        Self {
            turn_rad:     0.2,
            min_step_deg: 0.0001,
            max_step_deg: 0.0003,
        }
    }
}

impl MovementModel {
    pub fn next_position(&self, driver: &Driver, rng: &mut SimRng) -> GeoPoint {
        let history = &driver.route_history;
        let (origin, heading) = match history.len() {
            0 | 1 => (driver.position(), rng.gen_range(0.0..TAU)),
            n => {
                let last = history[n - 1];
                let prev = history[n - 2];
                let heading = (last.lat - prev.lat).atan2(last.lng - prev.lng);
                (last.to_geo(), heading + rng.symmetric(self.turn_rad))
            }
        };
        let step = rng.gen_range(self.min_step_deg..=self.max_step_deg);
        origin.offset(step * heading.sin(), step * heading.cos())
    }
}
