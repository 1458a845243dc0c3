//! The `DriverStateStore` — authoritative driver map plus presentation state.

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use fleet_core::{DriverId, DriverStatus, DriverUpdate, SimRng, Timestamp};

use crate::{Driver, MovementModel, PopulationGenerator};

/// Status filter applied by [`DriverStateStore::filtered`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Delivering,
    Paused,
    Idle,
}

impl StatusFilter {
    pub fn matches(self, status: DriverStatus) -> bool {
        match self {
            StatusFilter::All        => true,
            StatusFilter::Delivering => status == DriverStatus::Delivering,
            StatusFilter::Paused     => status == DriverStatus::Paused,
            StatusFilter::Idle       => status == DriverStatus::Idle,
        }
    }
}

/// Owns every [`Driver`].
///
/// Drivers live in a hash map keyed by id; `order` remembers registration
/// order so iteration is stable across runs with the same seed.  All
/// mutations are plain `&mut self` methods: the engine serializes them onto
/// one execution context, so there is no internal locking.
///
/// Mutations that name an unknown driver are silent no-ops returning `false`.
/// Updates can race with population resets and must never resurrect a
/// removed driver.
#[derive(Debug, Default)]
pub struct DriverStateStore {
    drivers:  FxHashMap<DriverId, Driver>,
    order:    Vec<DriverId>,
    movement: MovementModel,
    selected: Option<DriverId>,
    filter:   StatusFilter,
    error:    Option<String>,
    loading:  bool,
}

impl DriverStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_drivers(drivers: Vec<Driver>) -> Self {
        let mut store = Self::new();
        store.replace_all(drivers);
        store
    }

    // ── Read accessors ────────────────────────────────────────────────────

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: DriverId) -> bool {
        self.drivers.contains_key(&id)
    }

    pub fn get(&self, id: DriverId) -> Option<&Driver> {
        self.drivers.get(&id)
    }

    /// Ids in registration order.
    pub fn ids(&self) -> &[DriverId] {
        &self.order
    }

    /// Drivers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Driver> + '_ {
        self.order.iter().filter_map(|id| self.drivers.get(id))
    }

    /// Cloned snapshot of every driver, in registration order.
    pub fn snapshot(&self) -> Vec<Driver> {
        self.iter().cloned().collect()
    }

    pub(crate) fn get_mut(&mut self, id: DriverId) -> Option<&mut Driver> {
        self.drivers.get_mut(&id)
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Replace the whole population.  Later duplicates of an id win.  The
    /// selection survives only if the selected driver is still present.
    pub fn replace_all(&mut self, drivers: Vec<Driver>) {
        self.drivers.clear();
        self.order.clear();
        for driver in drivers {
            let id = driver.id;
            if self.drivers.insert(id, driver).is_none() {
                self.order.push(id);
            }
        }
        if self.selected.is_some_and(|id| !self.drivers.contains_key(&id)) {
            self.selected = None;
        }
    }

    /// Regenerate `count` drivers and replace the map wholesale.
    pub fn reset(
        &mut self,
        generator: &PopulationGenerator,
        count:     usize,
        now:       Timestamp,
        rng:       &mut SimRng,
    ) {
        self.replace_all(generator.generate(count, now, rng));
        debug!("store reset to {} drivers", self.len());
    }

    /// Apply an authoritative update.  Position, status and ETA are
    /// overwritten; a history point is appended only when the new status is
    /// `delivering` and the position moved.  Returns `false` for an unknown
    /// driver.
    pub fn apply_confirmed_update(&mut self, update: &DriverUpdate, now: Timestamp) -> bool {
        match self.drivers.get_mut(&update.driver_id) {
            Some(driver) => {
                driver.apply_update(update, now);
                true
            }
            None => {
                debug!("dropping update for unknown driver {}", update.driver_id);
                false
            }
        }
    }

    /// Step a delivering driver along its random walk and record the new
    /// point.  Returns `false` (and changes nothing) for unknown or
    /// non-delivering drivers.
    pub fn advance(&mut self, id: DriverId, now: Timestamp, rng: &mut SimRng) -> bool {
        let movement = self.movement;
        match self.drivers.get_mut(&id) {
            Some(driver) if driver.is_delivering() => {
                let next = movement.next_position(driver, rng);
                driver.move_to(next, now);
                true
            }
            _ => false,
        }
    }

    // ── Presentation state ────────────────────────────────────────────────

    /// Select `id`, or clear the selection with `None`.  Selecting an id that
    /// is not in the store clears the selection.
    pub fn select_driver(&mut self, id: Option<DriverId>) {
        self.selected = id.filter(|id| self.drivers.contains_key(id));
    }

    pub fn selected_id(&self) -> Option<DriverId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Driver> {
        self.selected.and_then(|id| self.drivers.get(&id))
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// Drivers matching the current filter, in registration order.
    pub fn filtered(&self) -> impl Iterator<Item = &Driver> + '_ {
        let filter = self.filter;
        self.iter().filter(move |d| filter.matches(d.status))
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
