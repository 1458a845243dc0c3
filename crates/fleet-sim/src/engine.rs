//! The `Engine` — synchronous core that owns all driver state.

use std::sync::Arc;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use tokio::sync::{broadcast, watch};

use fleet_core::{Clock, DriverId, DriverUpdate, EngineConfig, SimRng, Tick, Timestamp};
use fleet_route::PositionSimulator;
use fleet_state::{
    ActionKind, DeliveryAction, Driver, DriverStateStore, OptimisticUpdateManager,
    PopulationGenerator, StateError, StatusFilter,
};

use crate::{codec, CompletionWatcher, FleetObserver, SimResult, UpdateBroadcaster, WatcherReport};

/// The simulation-and-reconciliation engine.
///
/// `Engine` holds every piece of mutable state: the driver store, the pending
/// optimistic actions, the per-driver routes, and the two tick sources.  Its
/// methods are plain `&mut self` calls, each one atomic with respect to the
/// others.  Run it directly for deterministic tests, or hand it to
/// [`EngineHandle::spawn`][crate::EngineHandle::spawn] to drive it from
/// timers and async callers.
///
/// Every method that mutates driver or presentation state bumps the state
/// revision, publishes it on the `watch` channel, and calls
/// [`FleetObserver::on_state_changed`].
///
/// Create via [`EngineBuilder`][crate::EngineBuilder].
pub struct Engine {
    pub(crate) config:      EngineConfig,
    pub(crate) clock:       Arc<dyn Clock>,
    pub(crate) rng:         SimRng,
    pub(crate) store:       DriverStateStore,
    pub(crate) optimistic:  OptimisticUpdateManager,
    pub(crate) simulator:   PositionSimulator,
    pub(crate) population:  PopulationGenerator,
    pub(crate) broadcaster: UpdateBroadcaster,
    pub(crate) watcher:     CompletionWatcher,
    pub(crate) observers:   Vec<Box<dyn FleetObserver>>,
    pub(crate) revision:    u64,
    pub(crate) revision_tx: watch::Sender<u64>,
}

impl Engine {
    // ── Queries ───────────────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn store(&self) -> &DriverStateStore {
        &self.store
    }

    pub fn driver(&self, id: DriverId) -> Option<&Driver> {
        self.store.get(id)
    }

    /// Snapshot of every driver, in registration order.
    pub fn drivers(&self) -> Vec<Driver> {
        self.store.snapshot()
    }

    /// Snapshot of the pending optimistic actions.
    pub fn pending_actions(&self) -> FxHashMap<DriverId, DeliveryAction> {
        self.optimistic.pending()
    }

    pub fn simulator(&self) -> &PositionSimulator {
        &self.simulator
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn subscribe_updates(&self) -> broadcast::Receiver<String> {
        self.broadcaster.subscribe()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<u64> {
        self.revision_tx.subscribe()
    }

    pub fn is_broadcasting(&self) -> bool {
        self.broadcaster.is_running()
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_running()
    }

    pub fn broadcast_ticks(&self) -> Tick {
        self.broadcaster.ticks()
    }

    // ── Optimistic actions ────────────────────────────────────────────────

    /// Apply `kind` to `driver`, keyed by the driver id.
    ///
    /// # Errors
    ///
    /// [`StateError::InvalidTransition`] for `reassign` while the driver is
    /// delivering; nothing is changed.  An unknown driver is not an error:
    /// the call returns `Ok(false)`.
    pub fn apply_optimistic_action(&mut self, driver: DriverId, kind: ActionKind) -> SimResult<bool> {
        self.apply_optimistic(driver, DeliveryAction::new(kind, driver))
    }

    /// Apply `action` under an explicit `key`.
    pub fn apply_optimistic(&mut self, key: DriverId, action: DeliveryAction) -> SimResult<bool> {
        if action.kind == ActionKind::Reassign {
            if let Some(d) = self.store.get(action.driver_id).filter(|d| d.is_delivering()) {
                return Err(StateError::InvalidTransition {
                    driver: d.id,
                    status: d.status,
                    action: action.kind,
                }
                .into());
            }
        }
        let now = self.now();
        let applied = self.optimistic.apply(
            key,
            action,
            &mut self.store,
            self.config.eta_range(),
            now,
            &mut self.rng,
        );
        if applied {
            self.notify();
        }
        Ok(applied)
    }

    pub fn confirm_optimistic_action(&mut self, key: DriverId) -> Option<DeliveryAction> {
        let confirmed = self.optimistic.confirm(key);
        if confirmed.is_some() {
            self.notify();
        }
        confirmed
    }

    /// Roll back `key` under the configured [`RollbackPolicy`][fleet_core::RollbackPolicy].
    /// The store's error is raised even if nothing was pending.
    pub fn rollback_optimistic_action(&mut self, key: DriverId) -> Option<DeliveryAction> {
        let rolled = self.optimistic.rollback(key, self.config.rollback_policy, &mut self.store);
        self.notify();
        rolled
    }

    /// Reassign the selected driver and clear the selection.
    ///
    /// # Errors
    ///
    /// - [`StateError::NothingSelected`] if no driver is selected.
    /// - [`StateError::InvalidTransition`] if the selected driver is
    ///   delivering; the selection is kept.
    pub fn reassign_selected(&mut self) -> SimResult<DriverId> {
        let id = self.store.selected_id().ok_or(StateError::NothingSelected)?;
        self.apply_optimistic_action(id, ActionKind::Reassign)?;
        self.store.select_driver(None);
        self.notify();
        Ok(id)
    }

    // ── Presentation intents ──────────────────────────────────────────────

    pub fn select_driver(&mut self, id: Option<DriverId>) {
        self.store.select_driver(id);
        self.notify();
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.store.set_filter(filter);
        self.notify();
    }

    pub fn clear_error(&mut self) {
        self.store.clear_error();
        self.notify();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.store.set_loading(loading);
        self.notify();
    }

    // ── Population ────────────────────────────────────────────────────────

    /// Replace every driver with a freshly generated population of
    /// `config.population`, rebuild all routes, and drop pending actions.
    pub fn reset_population(&mut self) {
        let now = self.now();
        self.store.reset(&self.population, self.config.population, now, &mut self.rng);
        self.optimistic.clear();
        self.initialize_routes();
        info!("population reset: {} drivers", self.store.len());
        self.notify();
    }

    /// Regenerate one route per driver currently in the store.
    pub fn initialize_routes(&mut self) {
        let bases: Vec<_> = self.store.iter().map(|d| (d.id, d.position())).collect();
        self.simulator.initialize_routes(bases, &mut self.rng);
    }

    // ── Inbound updates ───────────────────────────────────────────────────

    /// Apply an authoritative update.  Returns `false` for an unknown driver.
    pub fn apply_confirmed_update(&mut self, update: &DriverUpdate) -> bool {
        let now = self.now();
        if !self.store.apply_confirmed_update(update, now) {
            return false;
        }
        if self.config.updates_confirm_pending {
            self.optimistic.confirm(update.driver_id);
        }
        self.notify();
        true
    }

    /// Decode and apply one inbound message.
    ///
    /// # Errors
    ///
    /// Decoding failures are logged and returned; the store is untouched.
    pub fn deliver_message(&mut self, text: &str) -> SimResult<bool> {
        match codec::decode(text) {
            Ok(update) => Ok(self.apply_confirmed_update(&update)),
            Err(e) => {
                warn!("dropping inbound message: {e}");
                Err(e)
            }
        }
    }

    // ── Lifecycle and ticks ───────────────────────────────────────────────

    /// Start the broadcaster.  A no-op returning `false` if already running.
    pub fn start(&mut self) -> bool {
        self.broadcaster.start()
    }

    /// Stop the broadcaster.  A no-op returning `false` if not running.
    pub fn stop(&mut self) -> bool {
        self.broadcaster.stop()
    }

    pub fn start_watcher(&mut self) -> bool {
        self.watcher.start()
    }

    pub fn stop_watcher(&mut self) -> bool {
        self.watcher.stop()
    }

    /// One broadcaster tick.  Emits nothing while stopped.
    pub fn broadcast_tick(&mut self) -> Vec<DriverUpdate> {
        if !self.broadcaster.is_running() {
            return Vec::new();
        }
        let now = self.now();
        let (tick, sent) =
            self.broadcaster.tick(&mut self.simulator, &self.store, now, &mut self.rng);
        for obs in &mut self.observers {
            for update in &sent {
                obs.on_update(tick, update);
            }
            obs.on_tick_end(tick, sent.len());
        }
        sent
    }

    /// One completion-watcher tick.  Does nothing while stopped.
    pub fn watcher_tick(&mut self) -> WatcherReport {
        if !self.watcher.is_running() {
            return WatcherReport::default();
        }
        let now = self.now();
        let report = self.watcher.tick(
            &mut self.store,
            &mut self.optimistic,
            self.config.eta_range(),
            now,
            &mut self.rng,
        );
        for obs in &mut self.observers {
            for &id in &report.completed {
                obs.on_completion(id);
            }
        }
        if !report.is_empty() {
            self.notify();
        }
        report
    }

    /// Stop both tick sources and tell observers.
    pub fn shutdown(&mut self) {
        self.broadcaster.stop();
        self.watcher.stop();
        for obs in &mut self.observers {
            obs.on_shutdown(&self.store);
        }
        info!("engine shut down at revision {}", self.revision);
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn notify(&mut self) {
        self.revision += 1;
        self.revision_tx.send_replace(self.revision);
        for obs in &mut self.observers {
            obs.on_state_changed(self.revision, &self.store);
        }
        debug!("state revision {}", self.revision);
    }
}
