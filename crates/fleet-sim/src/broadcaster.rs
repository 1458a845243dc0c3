//! The `UpdateBroadcaster` — one serialized update per driver per tick.

use log::{debug, info, warn};
use tokio::sync::broadcast;

use fleet_core::{DriverUpdate, SimRng, Tick, Timestamp};
use fleet_route::{CurrentStatus, PositionSimulator};
use fleet_state::DriverStateStore;

use crate::codec;

/// Fans simulated updates out to subscribers.
///
/// Delivery is fire-and-forget: a send with no subscribers is not an error,
/// and a subscriber that falls more than the channel capacity behind sees
/// `RecvError::Lagged` instead of slowing the tick.
///
/// The running flag is the source of truth for whether ticks happen; the
/// runtime creates or drops its timer to follow it.
pub struct UpdateBroadcaster {
    sender:  broadcast::Sender<String>,
    running: bool,
    tick:    Tick,
}

impl UpdateBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender, running: false, tick: Tick::ZERO }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.sender.subscribe()
    }

    pub fn sender(&self) -> broadcast::Sender<String> {
        self.sender.clone()
    }

    /// Returns `false` (and does nothing) if already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            debug!("broadcaster already running");
            return false;
        }
        self.running = true;
        info!("broadcaster started");
        true
    }

    /// Returns `false` (and does nothing) if not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            debug!("broadcaster already stopped");
            return false;
        }
        self.running = false;
        info!("broadcaster stopped after {} ticks", self.tick.0);
        true
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of ticks emitted so far.
    #[inline]
    pub fn ticks(&self) -> Tick {
        self.tick
    }

    /// Compute and emit one update for every registered driver, in
    /// registration order.  Drivers the store no longer holds are skipped.
    /// Returns the updates that were sent, tagged with this tick.
    pub fn tick(
        &mut self,
        simulator: &mut PositionSimulator,
        store:     &DriverStateStore,
        now:       Timestamp,
        rng:       &mut SimRng,
    ) -> (Tick, Vec<DriverUpdate>) {
        let tick = self.tick;
        self.tick = tick.next();

        let ids: Vec<_> = simulator.registered().collect();
        let mut sent = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(driver) = store.get(id) else { continue };
            let current = CurrentStatus { status: driver.status, eta: driver.eta };
            let Some(update) = simulator.compute_next_update(id, current, now, rng) else { continue };
            match codec::encode(&update) {
                Ok(message) => {
                    // No receivers is fine.
                    let _ = self.sender.send(message);
                    sent.push(update);
                }
                Err(e) => warn!("failed to encode update for {id}: {e}"),
            }
        }
        debug!("broadcast {tick}: {} updates", sent.len());
        (tick, sent)
    }
}
