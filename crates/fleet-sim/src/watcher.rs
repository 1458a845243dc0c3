//! The `CompletionWatcher` — finishes deliveries whose ETA has passed.

use log::{debug, info};

use fleet_core::{DriverId, EtaRange, SimRng, Timestamp};
use fleet_state::{ActionKind, DeliveryAction, DriverStateStore, OptimisticUpdateManager};

/// What one watcher tick did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatcherReport {
    /// Drivers that received a `complete` action this tick.
    pub completed: Vec<DriverId>,
    /// Drivers stepped along their walk.
    pub advanced:  usize,
}

impl WatcherReport {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty() && self.advanced == 0
    }
}

/// Scans delivering drivers each tick: overdue ones get an optimistic
/// `complete` action, the rest take one movement step.
#[derive(Debug)]
pub struct CompletionWatcher {
    running:      bool,
    /// Confirm each `complete` immediately after applying it.
    auto_confirm: bool,
}

impl CompletionWatcher {
    pub fn new(auto_confirm: bool) -> Self {
        Self { running: true, auto_confirm }
    }

    pub fn start(&mut self) -> bool {
        let changed = !self.running;
        self.running = true;
        changed
    }

    pub fn stop(&mut self) -> bool {
        let changed = self.running;
        self.running = false;
        changed
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn tick(
        &mut self,
        store:     &mut DriverStateStore,
        manager:   &mut OptimisticUpdateManager,
        eta_range: EtaRange,
        now:       Timestamp,
        rng:       &mut SimRng,
    ) -> WatcherReport {
        let delivering: Vec<(DriverId, Timestamp)> = store
            .iter()
            .filter(|d| d.is_delivering())
            .map(|d| (d.id, d.eta))
            .collect();

        let mut report = WatcherReport::default();
        for (id, eta) in delivering {
            if eta <= now {
                let action = DeliveryAction::new(ActionKind::Complete, id);
                if manager.apply(id, action, store, eta_range, now, rng) {
                    if self.auto_confirm {
                        manager.confirm(id);
                    }
                    info!("delivery by {id} completed");
                    report.completed.push(id);
                }
            } else if store.advance(id, now, rng) {
                report.advanced += 1;
            }
        }
        debug!(
            "watcher: {} completed, {} advanced",
            report.completed.len(),
            report.advanced
        );
        report
    }
}
