//! `fleet-core` — foundational types for the fleet tracking engine.
//!
//! This crate is a dependency of every other `fleet-*` crate.  It has no
//! `fleet-*` dependencies of its own.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `DriverId`                                            |
//! | [`geo`]         | `GeoPoint`, `LngLat`, haversine distance              |
//! | [`time`]        | `Timestamp`, `EtaRange`, `Tick`, `Clock`, `ManualClock` |
//! | [`rng`]         | `SimRng`                                              |
//! | [`status`]      | `DriverStatus` enum                                   |
//! | [`update`]      | `DriverUpdate` — one confirmed position/status change |
//! | [`config`]      | `EngineConfig`, `RollbackPolicy`                      |
//! | [`error`]       | `FleetError`, `FleetResult`                           |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod status;
pub mod time;
pub mod update;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{EngineConfig, RollbackPolicy};
pub use error::{FleetError, FleetResult};
pub use geo::{GeoPoint, LngLat};
pub use ids::DriverId;
pub use rng::SimRng;
pub use status::DriverStatus;
pub use time::{Clock, EtaRange, ManualClock, SystemClock, Tick, Timestamp};
pub use update::DriverUpdate;
