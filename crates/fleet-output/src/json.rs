//! JSON driver snapshot file: the engine's restart cache.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::debug;

use fleet_state::Driver;

use crate::OutputResult;
use crate::writer::OutputWriter;

/// A JSON array of drivers at a fixed path.
///
/// Saves go to a sibling temp file that is renamed over the target, so a
/// reader never sees a half-written snapshot.
pub struct JsonSnapshotFile {
    path: PathBuf,
}

impl JsonSnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, drivers: &[Driver]) -> OutputResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut out = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut out, drivers)?;
            out.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        debug!("saved {} drivers to {}", drivers.len(), self.path.display());
        Ok(())
    }

    /// `Ok(None)` when no snapshot has been saved yet.
    pub fn load(&self) -> OutputResult<Option<Vec<Driver>>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let drivers: Vec<Driver> = serde_json::from_reader(BufReader::new(file))?;
        Ok(Some(drivers))
    }
}

impl OutputWriter for JsonSnapshotFile {
    fn write_snapshot(&mut self, drivers: &[Driver]) -> OutputResult<()> {
        self.save(drivers)
    }
}
