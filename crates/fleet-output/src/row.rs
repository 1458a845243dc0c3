//! Plain data row types written by output backends.

use fleet_core::{DriverStatus, DriverUpdate, Tick};

/// One broadcast update, flattened for tabular output.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRow {
    pub tick:      u64,
    pub driver_id: String,
    pub latitude:  f64,
    pub longitude: f64,
    pub status:    DriverStatus,
    /// Unix milliseconds.
    pub eta:       i64,
}

impl PositionRow {
    pub fn from_update(tick: Tick, update: &DriverUpdate) -> Self {
        Self {
            tick:      tick.0,
            driver_id: update.driver_id.to_string(),
            latitude:  update.latitude,
            longitude: update.longitude,
            status:    update.status,
            eta:       update.eta.as_millis(),
        }
    }
}

/// Summary for one broadcaster tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:    u64,
    pub emitted: u64,
}
