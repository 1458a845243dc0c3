//! Engine observer trait for persistence and data collection.

use fleet_core::{DriverId, DriverUpdate, Tick};
use fleet_state::DriverStateStore;

/// Callbacks invoked by the [`Engine`][crate::Engine] as it runs.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  Observers run on the engine's execution
/// context and must not block for long.
///
/// # Example — completion counter
///
/// ```rust,ignore
/// struct Completions(usize);
///
/// impl FleetObserver for Completions {
///     fn on_completion(&mut self, _driver: DriverId) {
///         self.0 += 1;
///     }
/// }
/// ```
pub trait FleetObserver: Send {
    /// Called for every update the broadcaster emits.
    fn on_update(&mut self, _tick: Tick, _update: &DriverUpdate) {}

    /// Called once per broadcaster tick after all updates were emitted.
    fn on_tick_end(&mut self, _tick: Tick, _emitted: usize) {}

    /// Called after every mutating command with the new state revision.
    ///
    /// Provides read-only access to the whole store so a persistence layer
    /// can snapshot it without the engine knowing the format.
    fn on_state_changed(&mut self, _revision: u64, _store: &DriverStateStore) {}

    /// Called when the watcher completes a delivery.
    fn on_completion(&mut self, _driver: DriverId) {}

    /// Called once when the engine shuts down.
    fn on_shutdown(&mut self, _store: &DriverStateStore) {}
}

/// A [`FleetObserver`] that does nothing.
pub struct NoopObserver;

impl FleetObserver for NoopObserver {}
