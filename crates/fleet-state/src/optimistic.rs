//! Speculative driver actions: apply now, confirm or roll back later.

use std::fmt;

use log::{debug, info};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use fleet_core::{DriverId, DriverStatus, EtaRange, RollbackPolicy, SimRng, Timestamp};

use crate::DriverStateStore;

/// Message stored on the store when an action is rolled back.
pub const ROLLBACK_ERROR: &str = "Action failed. Please try again.";

/// The four delivery actions a consumer can take on a driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Paused,
    Resume,
    Reassign,
    Complete,
}

impl ActionKind {
    /// Status the driver takes on as soon as the action is applied.
    pub fn target_status(self) -> DriverStatus {
        match self {
            ActionKind::Paused   => DriverStatus::Paused,
            ActionKind::Resume   => DriverStatus::Delivering,
            ActionKind::Reassign => DriverStatus::Delivering,
            ActionKind::Complete => DriverStatus::Idle,
        }
    }

    /// Whether applying the action draws a fresh ETA.
    pub fn refreshes_eta(self) -> bool {
        matches!(self, ActionKind::Resume | ActionKind::Reassign)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Paused   => "paused",
            ActionKind::Resume   => "resume",
            ActionKind::Reassign => "reassign",
            ActionKind::Complete => "complete",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A delivery action as it appears on the wire:
/// `{"type": "reassign", "driverId": "...", "targetDriverId": "..."}`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAction {
    #[serde(rename = "type")]
    pub kind:             ActionKind,
    pub driver_id:        DriverId,
    /// Carried for wire compatibility; the engine does not interpret it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_driver_id: Option<DriverId>,
}

impl DeliveryAction {
    pub fn new(kind: ActionKind, driver_id: DriverId) -> Self {
        Self { kind, driver_id, target_driver_id: None }
    }
}

/// Driver fields captured at apply time, restored by
/// [`RollbackPolicy::RestorePreImage`].
#[derive(Copy, Clone, Debug, PartialEq)]
struct PreImage {
    driver: DriverId,
    status: DriverStatus,
    eta:    Timestamp,
}

#[derive(Clone, Debug)]
struct Pending {
    action:    DeliveryAction,
    pre_image: PreImage,
}

/// Tracks in-flight optimistic actions, at most one per key.
///
/// Per key: `absent → pending → absent`, leaving through either
/// [`confirm`](Self::confirm) or [`rollback`](Self::rollback).  A second
/// [`apply`](Self::apply) for a pending key replaces the action
/// (last writer wins) but keeps the original pre-image, so a rollback under
/// `RestorePreImage` returns the driver to where it was before the first
/// speculative change.
#[derive(Debug, Default)]
pub struct OptimisticUpdateManager {
    pending: FxHashMap<DriverId, Pending>,
}

impl OptimisticUpdateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `action` under `key` and immediately mutate the referenced
    /// driver: status per [`ActionKind::target_status`], plus a fresh ETA for
    /// `resume` and `reassign`.
    ///
    /// Returns `false` without recording anything if the action names a
    /// driver that is not in the store.
    pub fn apply(
        &mut self,
        key:       DriverId,
        action:    DeliveryAction,
        store:     &mut DriverStateStore,
        eta_range: EtaRange,
        now:       Timestamp,
        rng:       &mut SimRng,
    ) -> bool {
        let Some(driver) = store.get_mut(action.driver_id) else {
            debug!("optimistic {} ignored: unknown driver {}", action.kind, action.driver_id);
            return false;
        };

        let captured = PreImage { driver: driver.id, status: driver.status, eta: driver.eta };
        driver.status = action.kind.target_status();
        if action.kind.refreshes_eta() {
            driver.eta = eta_range.sample(now, rng);
        }
        driver.touch(now);

        let pre_image = match self.pending.get(&key) {
            Some(prev) if prev.pre_image.driver == captured.driver => prev.pre_image,
            _ => captured,
        };
        self.pending.insert(key, Pending { action, pre_image });
        info!("optimistic {} applied to {} (key {key})", action.kind, action.driver_id);
        true
    }

    /// Drop the pending entry for `key`; the speculative mutation stays.
    pub fn confirm(&mut self, key: DriverId) -> Option<DeliveryAction> {
        let pending = self.pending.remove(&key)?;
        info!("optimistic {} confirmed (key {key})", pending.action.kind);
        Some(pending.action)
    }

    /// Drop the pending entry for `key` and raise the store's user-visible
    /// error.  Under `RestorePreImage` the driver's status and ETA revert to
    /// their values before the action; under `KeepOptimistic` they stay.
    pub fn rollback(
        &mut self,
        key:    DriverId,
        policy: RollbackPolicy,
        store:  &mut DriverStateStore,
    ) -> Option<DeliveryAction> {
        store.set_error(ROLLBACK_ERROR);
        let pending = self.pending.remove(&key)?;
        if policy == RollbackPolicy::RestorePreImage {
            if let Some(driver) = store.get_mut(pending.pre_image.driver) {
                driver.status = pending.pre_image.status;
                driver.eta    = pending.pre_image.eta;
            }
        }
        info!("optimistic {} rolled back (key {key}, {policy:?})", pending.action.kind);
        Some(pending.action)
    }

    pub fn get(&self, key: DriverId) -> Option<&DeliveryAction> {
        self.pending.get(&key).map(|p| &p.action)
    }

    pub fn is_pending(&self, key: DriverId) -> bool {
        self.pending.contains_key(&key)
    }

    /// Snapshot of every pending action.
    pub fn pending(&self) -> FxHashMap<DriverId, DeliveryAction> {
        self.pending.iter().map(|(k, p)| (*k, p.action)).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Forget every pending action without touching driver state.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
