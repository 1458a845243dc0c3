//! `PersistenceObserver<W>` — bridges `FleetObserver` to an `OutputWriter`.

use log::warn;

use fleet_core::{DriverUpdate, Tick};
use fleet_sim::FleetObserver;
use fleet_state::DriverStateStore;

use crate::row::{PositionRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`FleetObserver`] that logs broadcast positions and snapshots the driver
/// set to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `FleetObserver`
/// methods have no return value, so a failing disk never stalls the engine.
/// Check for errors with [`take_error`][Self::take_error].
pub struct PersistenceObserver<W: OutputWriter> {
    writer:     W,
    pending:    Vec<PositionRow>,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> PersistenceObserver<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pending:    Vec::new(),
            last_error: None,
        }
    }

    /// Take the stored write error (if any).
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after a run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            warn!("persistence write failed: {e}");
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter + Send> FleetObserver for PersistenceObserver<W> {
    fn on_update(&mut self, tick: Tick, update: &DriverUpdate) {
        self.pending.push(PositionRow::from_update(tick, update));
    }

    fn on_tick_end(&mut self, tick: Tick, emitted: usize) {
        let rows = std::mem::take(&mut self.pending);
        if !rows.is_empty() {
            let result = self.writer.write_positions(&rows);
            self.store_err(result);
        }
        let row = TickSummaryRow { tick: tick.0, emitted: emitted as u64 };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_state_changed(&mut self, _revision: u64, store: &DriverStateStore) {
        let result = self.writer.write_snapshot(&store.snapshot());
        self.store_err(result);
    }

    fn on_shutdown(&mut self, store: &DriverStateStore) {
        let result = self.writer.write_snapshot(&store.snapshot());
        self.store_err(result);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
