//! The `PositionSimulator` — per-driver routes and the per-tick update rule.

use std::collections::HashMap;

use log::debug;

use fleet_core::{DriverId, DriverStatus, DriverUpdate, EngineConfig, EtaRange, GeoPoint, SimRng, Timestamp};

use crate::{DriverRoute, RouteGenerator};

/// Tunables for [`PositionSimulator::compute_next_update`].
#[derive(Debug, Clone, Copy)]
pub struct SimulatorSettings {
    pub generator:          RouteGenerator,
    pub jitter_deg:         f64,
    pub advance_probability: f64,
    pub progress_cycle_ms:  i64,
    pub eta_range:          EtaRange,
    /// Draw a random status and ETA for every update instead of echoing the
    /// driver's current ones.
    pub mutates_status:     bool,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SimulatorSettings {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            generator:           RouteGenerator::new(config.route_spread_deg),
            jitter_deg:          config.position_jitter_deg,
            advance_probability: config.route_advance_probability,
            progress_cycle_ms:   config.progress_cycle_ms,
            eta_range:           config.eta_range(),
            mutates_status:      config.broadcast_mutates_status,
        }
    }
}

/// The status and ETA a driver currently holds in the store.  Echoed into
/// updates when status mutation is switched off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentStatus {
    pub status: DriverStatus,
    pub eta:    Timestamp,
}

/// Holds one [`DriverRoute`] per registered driver, in registration order.
pub struct PositionSimulator {
    settings: SimulatorSettings,
    routes:   Vec<(DriverId, DriverRoute)>,
    index:    HashMap<DriverId, usize>,
}

impl PositionSimulator {
    pub fn new(settings: SimulatorSettings) -> Self {
        Self {
            settings,
            routes: Vec::new(),
            index:  HashMap::new(),
        }
    }

    pub fn settings(&self) -> &SimulatorSettings {
        &self.settings
    }

    /// Discard every existing route and generate a fresh one for each
    /// `(id, base)` pair.  Iteration order becomes the registration order.
    pub fn initialize_routes<I>(&mut self, drivers: I, rng: &mut SimRng)
    where
        I: IntoIterator<Item = (DriverId, GeoPoint)>,
    {
        self.routes.clear();
        self.index.clear();
        for (id, base) in drivers {
            let route = self.settings.generator.generate(base, rng);
            match self.index.get(&id) {
                Some(&slot) => self.routes[slot].1 = DriverRoute::new(route),
                None => {
                    self.index.insert(id, self.routes.len());
                    self.routes.push((id, DriverRoute::new(route)));
                }
            }
        }
        debug!("initialized {} driver routes", self.routes.len());
    }

    /// Registered driver ids in registration order.
    pub fn registered(&self) -> impl Iterator<Item = DriverId> + '_ {
        self.routes.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn route(&self, driver: DriverId) -> Option<&DriverRoute> {
        self.index.get(&driver).map(|&i| &self.routes[i].1)
    }

    /// Fraction of the shared interpolation cycle elapsed at `now`, in `[0, 1)`.
    pub fn progress(&self, now: Timestamp) -> f64 {
        let cycle = self.settings.progress_cycle_ms;
        now.as_millis().rem_euclid(cycle) as f64 / cycle as f64
    }

    /// Advance `driver` by one tick and describe where it is now.
    ///
    /// Returns `None` when `driver` has no route; callers must register
    /// drivers through [`initialize_routes`](Self::initialize_routes) first.
    /// `current` is only consulted when status mutation is switched off.
    pub fn compute_next_update(
        &mut self,
        driver:  DriverId,
        current: CurrentStatus,
        now:     Timestamp,
        rng:     &mut SimRng,
    ) -> Option<DriverUpdate> {
        let settings = self.settings;
        let progress = self.progress(now);
        let slot = *self.index.get(&driver)?;
        let route = &mut self.routes[slot].1;

        let (current_wp, next_wp) = route.segment();
        let position = current_wp
            .lerp(next_wp, progress)
            .offset(rng.symmetric(settings.jitter_deg), rng.symmetric(settings.jitter_deg));

        if rng.gen_bool(settings.advance_probability) {
            route.advance();
        }

        let (status, eta) = if settings.mutates_status {
            let status = *rng.choose(&DriverStatus::ALL).unwrap_or(&current.status);
            (status, settings.eta_range.sample(now, rng))
        } else {
            (current.status, current.eta)
        };

        Some(DriverUpdate {
            driver_id: driver,
            latitude:  position.lat,
            longitude: position.lon,
            status,
            eta,
        })
    }
}
