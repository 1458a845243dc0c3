//! `fleet-state` — authoritative driver state and optimistic reconciliation.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                        |
//! |----------------|-----------------------------------------------------------------|
//! | [`driver`]     | `Driver` — the tracked entity                                   |
//! | [`store`]      | `DriverStateStore` — driver map, selection, filter, error flag  |
//! | [`movement`]   | `MovementModel` — heading-persistent random walk for `advance`  |
//! | [`population`] | `PopulationGenerator` — synthetic drivers for resets            |
//! | [`optimistic`] | `OptimisticUpdateManager`, `DeliveryAction`, `ActionKind`       |
//! | [`query`]      | search/sort, counts, geofence over the store                    |
//! | [`error`]      | `StateError`, `StateResult<T>`                                  |
//!
//! # Reconciliation model
//!
//! Two kinds of writes reach the store:
//!
//! 1. **Confirmed updates** from the transport side overwrite position,
//!    status and ETA (last write wins per driver).
//! 2. **Optimistic actions** change status (and sometimes ETA) immediately
//!    and are recorded as pending until confirmed or rolled back.
//!
//! Neither path errors on an unknown driver; both are silent no-ops.

pub mod driver;
pub mod error;
pub mod movement;
pub mod optimistic;
pub mod population;
pub mod query;
pub mod store;

#[cfg(test)]
mod tests;

pub use driver::Driver;
pub use error::{StateError, StateResult};
pub use movement::MovementModel;
pub use optimistic::{ActionKind, DeliveryAction, OptimisticUpdateManager, ROLLBACK_ERROR};
pub use population::PopulationGenerator;
pub use query::{FleetCounts, SortField, SortOrder};
pub use store::{DriverStateStore, StatusFilter};
