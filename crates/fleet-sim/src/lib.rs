//! `fleet-sim` — the fleet simulation-and-reconciliation engine.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`codec`]       | JSON encode/decode of `{"type":"update", …}` messages         |
//! | [`broadcaster`] | `UpdateBroadcaster` — per-tick fan-out over `broadcast`       |
//! | [`watcher`]     | `CompletionWatcher` — completes overdue deliveries            |
//! | [`engine`]      | `Engine` — synchronous core, every command and tick           |
//! | [`builder`]     | `EngineBuilder` — fluent construction                         |
//! | [`observer`]    | `FleetObserver` trait + `NoopObserver`                        |
//! | [`runtime`]     | `EngineHandle` actor, timers, loopback transport              |
//! | [`error`]       | `SimError`, `SimResult<T>`                                    |
//!
//! # Data flow
//!
//! ```text
//!  PositionSimulator ──▶ UpdateBroadcaster ──▶ broadcast<String> ──▶ subscribers
//!                                                      │
//!                                      (loopback / transport)
//!                                                      ▼
//!  UI intents ──▶ Engine::apply_optimistic_action   Engine::deliver_message
//!                         │                                   │
//!                         ▼                                   ▼
//!                 OptimisticUpdateManager ──▶ DriverStateStore ◀── CompletionWatcher
//! ```
//!
//! Two timers drive the engine (both 2000 ms by default): the broadcaster
//! tick and the completion-watcher tick.  Everything else is a command.

pub mod broadcaster;
pub mod builder;
pub mod codec;
pub mod engine;
pub mod error;
pub mod observer;
pub mod runtime;
pub mod watcher;


pub use broadcaster::UpdateBroadcaster;
pub use builder::{EngineBuilder, DEFAULT_UPDATE_CAPACITY};
pub use engine::Engine;
pub use error::{SimError, SimResult};
pub use observer::{FleetObserver, NoopObserver};
pub use runtime::{spawn_loopback, EngineHandle, EngineTask};
pub use watcher::{CompletionWatcher, WatcherReport};
