//! `fleet-route` — synthetic routes and per-tick position simulation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`route`]     | `Route`, `DriverRoute`, `RouteGenerator`                      |
//! | [`simulator`] | `PositionSimulator` — one `DriverUpdate` per driver per tick  |
//!
//! # Movement model (broadcast side)
//!
//! Each registered driver owns a short loop of waypoints around its base
//! location and a cursor into it.  Every tick the simulator:
//!
//! 1. Interpolates between the cursor waypoint and the next one by a
//!    progress fraction shared by all drivers (derived from wall-clock time).
//! 2. Adds a small uniform jitter.
//! 3. Occasionally advances the cursor.
//!
//! This is demonstration motion, not routing: no road network is consulted.

pub mod route;
pub mod simulator;


pub use route::{DriverRoute, Route, RouteGenerator};
pub use simulator::{CurrentStatus, PositionSimulator, SimulatorSettings};
