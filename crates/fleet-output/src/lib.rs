//! `fleet-output` — the engine's persistence collaborator.
//!
//! | Backend             | Files created                            | Purpose                      |
//! |---------------------|------------------------------------------|------------------------------|
//! | `JsonSnapshotFile`  | one JSON array of drivers                | reload state at startup      |
//! | `CsvPositionLog`    | `positions.csv`, `tick_summaries.csv`    | offline analysis of the feed |
//!
//! Both implement [`OutputWriter`] and are driven by
//! [`PersistenceObserver`], which implements `fleet_sim::FleetObserver`.
//! A tuple `(A, B)` of writers is itself a writer.
//!
//! # Usage
//!
//! ```rust,ignore
//! use fleet_output::{CsvPositionLog, JsonSnapshotFile, PersistenceObserver};
//!
//! let snapshot = JsonSnapshotFile::new(dir.join("drivers.json"));
//! let restored = snapshot.load()?.unwrap_or_default();
//! let log      = CsvPositionLog::new(&dir)?;
//! let engine   = EngineBuilder::new(config)
//!     .initial_drivers(restored)
//!     .observer(PersistenceObserver::new((snapshot, log)))
//!     .build()?;
//! ```

pub mod csv;
pub mod error;
pub mod json;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvPositionLog;
pub use error::{OutputError, OutputResult};
pub use json::JsonSnapshotFile;
pub use observer::PersistenceObserver;
pub use row::{PositionRow, TickSummaryRow};
pub use writer::OutputWriter;
