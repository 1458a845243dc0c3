//! Fluent builder for constructing an [`Engine`].

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

use fleet_core::{Clock, EngineConfig, SimRng, SystemClock};
use fleet_route::{PositionSimulator, SimulatorSettings};
use fleet_state::{Driver, DriverStateStore, OptimisticUpdateManager, PopulationGenerator};

use crate::{CompletionWatcher, Engine, FleetObserver, SimError, SimResult, UpdateBroadcaster};

/// Default capacity of the update broadcast channel.
pub const DEFAULT_UPDATE_CAPACITY: usize = 256;

/// Fluent builder for [`Engine`].
///
/// # Optional inputs (have defaults)
///
/// | Method                   | Default                                   |
/// |--------------------------|-------------------------------------------|
/// | `.clock(c)`              | [`SystemClock`]                           |
/// | `.seed(s)`               | `config.seed`, else OS entropy            |
/// | `.initial_drivers(v)`    | A generated population of `config.population` |
/// | `.observer(o)`           | None                                      |
/// | `.update_capacity(n)`    | [`DEFAULT_UPDATE_CAPACITY`]               |
/// | `.watcher_running(b)`    | `true`                                    |
///
/// # Example
///
/// ```rust,ignore
/// let mut engine = EngineBuilder::new(EngineConfig::default())
///     .clock(ManualClock::new(Timestamp(0)))
///     .seed(42)
///     .build()?;
/// engine.start();
/// let updates = engine.broadcast_tick();
/// ```
pub struct EngineBuilder {
    config:          EngineConfig,
    clock:           Option<Arc<dyn Clock>>,
    seed:            Option<u64>,
    initial_drivers: Option<Vec<Driver>>,
    observers:       Vec<Box<dyn FleetObserver>>,
    update_capacity: usize,
    watcher_running: bool,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            seed:            config.seed,
            config,
            clock:           None,
            initial_drivers: None,
            observers:       Vec::new(),
            update_capacity: DEFAULT_UPDATE_CAPACITY,
            watcher_running: true,
        }
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Override `config.seed`.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start from previously persisted drivers instead of a generated
    /// population.  An empty vector falls back to generation.
    pub fn initial_drivers(mut self, drivers: Vec<Driver>) -> Self {
        self.initial_drivers = Some(drivers);
        self
    }

    pub fn observer(mut self, observer: impl FleetObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn update_capacity(mut self, capacity: usize) -> Self {
        self.update_capacity = capacity;
        self
    }

    /// Whether the completion watcher starts enabled.
    pub fn watcher_running(mut self, running: bool) -> Self {
        self.watcher_running = running;
        self
    }

    /// Validate the configuration, populate the store, and generate one
    /// route per driver.  The broadcaster starts stopped.
    pub fn build(self) -> SimResult<Engine> {
        self.config.validate().map_err(|e| SimError::Config(e.to_string()))?;

        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let mut rng = SimRng::from_optional_seed(self.seed);
        let population = PopulationGenerator::from_config(&self.config);

        let store = match self.initial_drivers {
            Some(drivers) if !drivers.is_empty() => {
                info!("restoring {} persisted drivers", drivers.len());
                DriverStateStore::from_drivers(drivers)
            }
            _ => {
                let drivers = population.generate(self.config.population, clock.now(), &mut rng);
                DriverStateStore::from_drivers(drivers)
            }
        };

        let mut watcher = CompletionWatcher::new(self.config.auto_confirm_completions);
        if !self.watcher_running {
            watcher.stop();
        }

        let (revision_tx, _) = watch::channel(0);
        let mut engine = Engine {
            simulator:   PositionSimulator::new(SimulatorSettings::from_config(&self.config)),
            broadcaster: UpdateBroadcaster::new(self.update_capacity),
            optimistic:  OptimisticUpdateManager::new(),
            config:      self.config,
            clock,
            rng,
            store,
            population,
            watcher,
            observers:   self.observers,
            revision:    0,
            revision_tx,
        };
        engine.initialize_routes();
        Ok(engine)
    }
}
