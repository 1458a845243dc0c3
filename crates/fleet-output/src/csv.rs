//! CSV position log.
//!
//! Creates two files in the configured output directory:
//! - `positions.csv`
//! - `tick_summaries.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{OutputResult, PositionRow, TickSummaryRow};

/// Appends every broadcast update to `positions.csv`.
pub struct CsvPositionLog {
    positions: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvPositionLog {
    /// Create (truncating) the two CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut positions = Writer::from_path(dir.join("positions.csv"))?;
        positions.write_record(["tick", "driver_id", "latitude", "longitude", "status", "eta"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["tick", "emitted"])?;

        Ok(Self {
            positions,
            summaries,
            finished: false,
        })
    }
}

impl OutputWriter for CsvPositionLog {
    fn write_positions(&mut self, rows: &[PositionRow]) -> OutputResult<()> {
        for row in rows {
            self.positions.write_record(&[
                row.tick.to_string(),
                row.driver_id.clone(),
                row.latitude.to_string(),
                row.longitude.to_string(),
                row.status.as_str().to_owned(),
                row.eta.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[row.tick.to_string(), row.emitted.to_string()])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.positions.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
