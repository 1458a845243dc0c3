//! Async runtime: one actor task owns the [`Engine`] and both timers.
//!
//! Every caller talks to the engine through an [`EngineHandle`], which sends
//! a boxed closure over an `mpsc` channel and awaits the reply on a
//! `oneshot`.  The actor runs commands and ticks one at a time, so no two
//! mutations ever interleave.
//!
//! After each command or tick the actor reconciles its timers with the
//! engine's running flags: a timer is created when a tick source starts and
//! dropped when it stops.  A stop therefore takes effect before its reply is
//! sent, and no tick can fire afterwards.

use std::future;
use std::time::Duration;

use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use fleet_core::DriverId;
use fleet_state::{ActionKind, DeliveryAction, Driver, StatusFilter};

use crate::{Engine, SimError, SimResult, WatcherReport};

const COMMAND_CAPACITY: usize = 64;

type Job = Box<dyn FnOnce(&mut Engine) + Send>;

enum Command {
    Run(Job),
    Shutdown,
}

// ── EngineHandle ──────────────────────────────────────────────────────────────

/// Cloneable async front end to a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
    updates:  broadcast::Sender<String>,
    state:    watch::Receiver<u64>,
}

/// The spawned actor task.  Dropping it detaches the task; call
/// [`shutdown`](Self::shutdown) to stop the timers and recover the engine.
pub struct EngineTask {
    handle: EngineHandle,
    join:   JoinHandle<Engine>,
}

impl EngineHandle {
    /// Move `engine` into a new actor task on the current tokio runtime.
    pub fn spawn(engine: Engine) -> EngineTask {
        let (tx, rx) = mpsc::channel(COMMAND_CAPACITY);
        let handle = EngineHandle {
            commands: tx,
            updates:  engine.broadcaster.sender(),
            state:    engine.subscribe_state(),
        };
        let join = tokio::spawn(run(engine, rx));
        EngineTask { handle, join }
    }

    /// Run `f` on the engine and return its result.
    pub async fn call<R, F>(&self, f: F) -> SimResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut Engine) -> R + Send + 'static,
    {
        let (reply, rx) = oneshot::channel();
        let job: Job = Box::new(move |engine| {
            let _ = reply.send(f(engine));
        });
        self.commands
            .send(Command::Run(job))
            .await
            .map_err(|_| SimError::EngineStopped)?;
        rx.await.map_err(|_| SimError::EngineStopped)
    }

    /// Serialized update messages, one per driver per broadcaster tick.
    pub fn subscribe_updates(&self) -> broadcast::Receiver<String> {
        self.updates.subscribe()
    }

    /// Revision counter, bumped after every state change.
    pub fn state_changes(&self) -> watch::Receiver<u64> {
        self.state.clone()
    }

    // ── Commands ──────────────────────────────────────────────────────────

    pub async fn start(&self) -> SimResult<bool> {
        self.call(Engine::start).await
    }

    pub async fn stop(&self) -> SimResult<bool> {
        self.call(Engine::stop).await
    }

    pub async fn start_watcher(&self) -> SimResult<bool> {
        self.call(Engine::start_watcher).await
    }

    pub async fn stop_watcher(&self) -> SimResult<bool> {
        self.call(Engine::stop_watcher).await
    }

    pub async fn apply_optimistic_action(&self, driver: DriverId, kind: ActionKind) -> SimResult<bool> {
        self.call(move |e| e.apply_optimistic_action(driver, kind)).await?
    }

    pub async fn apply_optimistic(&self, key: DriverId, action: DeliveryAction) -> SimResult<bool> {
        self.call(move |e| e.apply_optimistic(key, action)).await?
    }

    pub async fn confirm_optimistic_action(&self, key: DriverId) -> SimResult<Option<DeliveryAction>> {
        self.call(move |e| e.confirm_optimistic_action(key)).await
    }

    pub async fn rollback_optimistic_action(&self, key: DriverId) -> SimResult<Option<DeliveryAction>> {
        self.call(move |e| e.rollback_optimistic_action(key)).await
    }

    pub async fn reassign_selected(&self) -> SimResult<DriverId> {
        self.call(Engine::reassign_selected).await?
    }

    pub async fn select_driver(&self, id: Option<DriverId>) -> SimResult<()> {
        self.call(move |e| e.select_driver(id)).await
    }

    pub async fn set_filter(&self, filter: StatusFilter) -> SimResult<()> {
        self.call(move |e| e.set_filter(filter)).await
    }

    pub async fn clear_error(&self) -> SimResult<()> {
        self.call(Engine::clear_error).await
    }

    pub async fn reset_population(&self) -> SimResult<()> {
        self.call(Engine::reset_population).await
    }

    /// Hand one inbound message to the engine.
    pub async fn deliver(&self, message: String) -> SimResult<bool> {
        self.call(move |e| e.deliver_message(&message)).await?
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub async fn drivers(&self) -> SimResult<Vec<Driver>> {
        self.call(|e| e.drivers()).await
    }

    pub async fn driver(&self, id: DriverId) -> SimResult<Option<Driver>> {
        self.call(move |e| e.driver(id).cloned()).await
    }

    pub async fn pending_actions(&self) -> SimResult<FxHashMap<DriverId, DeliveryAction>> {
        self.call(|e| e.pending_actions()).await
    }

    pub async fn error(&self) -> SimResult<Option<String>> {
        self.call(|e| e.store().error().map(str::to_owned)).await
    }
}

impl EngineTask {
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Stop both timers, let observers flush, and return the engine.
    pub async fn shutdown(self) -> SimResult<Engine> {
        // A closed channel means the actor already exited; join regardless.
        let _ = self.handle.commands.send(Command::Shutdown).await;
        self.join.await.map_err(|e| {
            warn!("engine task failed: {e}");
            SimError::EngineStopped
        })
    }
}

// ── Actor loop ────────────────────────────────────────────────────────────────

struct Timers {
    broadcast: Option<Interval>,
    watcher:   Option<Interval>,
}

impl Timers {
    fn sync(&mut self, engine: &Engine) {
        let cfg = engine.config();
        sync_one(&mut self.broadcast, engine.is_broadcasting(), cfg.broadcast_interval_ms, "broadcast");
        sync_one(&mut self.watcher, engine.is_watching(), cfg.watcher_interval_ms, "watcher");
    }
}

fn sync_one(slot: &mut Option<Interval>, running: bool, period_ms: u64, name: &str) {
    match (running, slot.is_some()) {
        (true, false) => {
            let period = Duration::from_millis(period_ms);
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            *slot = Some(interval);
            debug!("{name} timer armed ({period_ms} ms)");
        }
        (false, true) => {
            *slot = None;
            debug!("{name} timer dropped");
        }
        _ => {}
    }
}

async fn next_tick(slot: &mut Option<Interval>) {
    match slot {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

async fn run(mut engine: Engine, mut commands: mpsc::Receiver<Command>) -> Engine {
    let mut timers = Timers { broadcast: None, watcher: None };
    timers.sync(&engine);
    info!("engine task started");

    loop {
        tokio::select! {
            biased;

            cmd = commands.recv() => match cmd {
                Some(Command::Run(job)) => job(&mut engine),
                Some(Command::Shutdown) | None => break,
            },
            _ = next_tick(&mut timers.broadcast) => {
                engine.broadcast_tick();
            }
            _ = next_tick(&mut timers.watcher) => {
                let report: WatcherReport = engine.watcher_tick();
                if !report.completed.is_empty() {
                    debug!("watcher completed {} deliveries", report.completed.len());
                }
            }
        }
        timers.sync(&engine);
    }

    engine.shutdown();
    engine
}

// ── Loopback transport ────────────────────────────────────────────────────────

/// Feed the engine's own update stream back into its inbound path, standing
/// in for a network transport.  The task ends once the actor has exited.
///
/// Live handles keep the update channel open, so the task watches the
/// command channel instead: it closes when the actor drops its receiver.
pub fn spawn_loopback(handle: &EngineHandle) -> JoinHandle<()> {
    let handle = handle.clone();
    let mut rx = handle.subscribe_updates();
    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                biased;

                _ = handle.commands.closed() => break,
                received = rx.recv() => received,
            };
            match received {
                Ok(message) => match handle.deliver(message).await {
                    Ok(_) => {}
                    Err(SimError::EngineStopped) => break,
                    // Already logged by the engine.
                    Err(_) => {}
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("loopback lagged, skipped {n} updates");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("loopback finished");
    })
}
