//! The `OutputWriter` trait implemented by all backend writers.

use fleet_state::Driver;

use crate::{OutputResult, PositionRow, TickSummaryRow};

/// Trait implemented by the CSV log and the JSON snapshot file.
///
/// Every method defaults to a no-op so a backend only implements the kinds of
/// output it stores.  Errors are stored by the observer and retrieved with
/// [`PersistenceObserver::take_error`][crate::PersistenceObserver::take_error].
pub trait OutputWriter {
    /// Write the updates emitted during one tick.
    fn write_positions(&mut self, _rows: &[PositionRow]) -> OutputResult<()> {
        Ok(())
    }

    fn write_tick_summary(&mut self, _row: &TickSummaryRow) -> OutputResult<()> {
        Ok(())
    }

    /// Persist the full driver set.
    fn write_snapshot(&mut self, _drivers: &[Driver]) -> OutputResult<()> {
        Ok(())
    }

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent — safe to call more than once.
    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}

/// Drive two writers from one observer.  Both are always called; the first
/// error is returned.
impl<A: OutputWriter, B: OutputWriter> OutputWriter for (A, B) {
    fn write_positions(&mut self, rows: &[PositionRow]) -> OutputResult<()> {
        let a = self.0.write_positions(rows);
        let b = self.1.write_positions(rows);
        a.and(b)
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let a = self.0.write_tick_summary(row);
        let b = self.1.write_tick_summary(row);
        a.and(b)
    }

    fn write_snapshot(&mut self, drivers: &[Driver]) -> OutputResult<()> {
        let a = self.0.write_snapshot(drivers);
        let b = self.1.write_snapshot(drivers);
        a.and(b)
    }

    fn finish(&mut self) -> OutputResult<()> {
        let a = self.0.finish();
        let b = self.1.finish();
        a.and(b)
    }
}
