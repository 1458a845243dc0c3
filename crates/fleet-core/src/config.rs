//! Engine configuration.
//!
//! Typically left at its defaults, or loaded from a JSON file by the
//! application crate and passed to the engine builder.  Every field has a
//! default so partial files are accepted.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{EtaRange, FleetError, FleetResult, GeoPoint};

/// What `rollback` does to the driver fields an optimistic action changed.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackPolicy {
    /// Leave the optimistic mutation in place; only the error is raised.
    #[default]
    KeepOptimistic,
    /// Restore the status and ETA captured when the action was applied.
    RestorePreImage,
}

/// Top-level engine configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Period of the update broadcaster, milliseconds.
    pub broadcast_interval_ms: u64,

    /// Period of the completion watcher, milliseconds.
    pub watcher_interval_ms: u64,

    /// Drivers generated by a population reset.
    pub population: usize,

    /// Centre of the generated population and of the default geofence.
    pub base: GeoPoint,

    /// Half-width (degrees) of the square drivers are scattered over.
    pub population_spread_deg: f64,

    /// Half-width (degrees) of waypoint offsets around a driver's base.
    pub route_spread_deg: f64,

    /// Half-width (degrees) of the per-tick jitter added to broadcast positions.
    pub position_jitter_deg: f64,

    /// Chance per tick that a driver's route cursor moves to the next waypoint.
    pub route_advance_probability: f64,

    /// Length of the shared interpolation cycle, milliseconds.
    pub progress_cycle_ms: i64,

    /// Inclusive bounds for random ETAs, minutes from now.
    pub eta_min_minutes: i64,
    pub eta_max_minutes: i64,

    /// When `false`, broadcast updates carry the driver's current status and
    /// ETA instead of random draws.
    pub broadcast_mutates_status: bool,

    pub rollback_policy: RollbackPolicy,

    /// Confirm the `complete` actions raised by the watcher immediately.
    pub auto_confirm_completions: bool,

    /// A confirmed update for a driver resolves (confirms) the pending action
    /// keyed by that driver's id.
    pub updates_confirm_pending: bool,

    pub geofence_radius_km: f64,

    /// Master RNG seed.  `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            broadcast_interval_ms:     2_000,
            watcher_interval_ms:       2_000,
            population:                20,
            base:                      GeoPoint::new(47.548_243_307_135_12, -52.747_780_045_395_89),
            population_spread_deg:     0.05,
            route_spread_deg:          0.005,
            position_jitter_deg:       0.0005,
            route_advance_probability: 0.1,
            progress_cycle_ms:         10_000,
            eta_min_minutes:           5,
            eta_max_minutes:           50,
            broadcast_mutates_status:  true,
            rollback_policy:           RollbackPolicy::KeepOptimistic,
            auto_confirm_completions:  true,
            updates_confirm_pending:   true,
            geofence_radius_km:        1_000.0,
            seed:                      None,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    pub fn from_json_str(json: &str) -> FleetResult<Self> {
        let cfg: EngineConfig = serde_json::from_str(json)
            .map_err(|e| FleetError::Parse(format!("engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> FleetResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn eta_range(&self) -> EtaRange {
        EtaRange {
            min_minutes: self.eta_min_minutes,
            max_minutes: self.eta_max_minutes,
        }
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> FleetResult<()> {
        if self.broadcast_interval_ms == 0 || self.watcher_interval_ms == 0 {
            return Err(FleetError::Config("tick intervals must be non-zero".into()));
        }
        if self.population == 0 {
            return Err(FleetError::Config("population must be at least 1".into()));
        }
        if self.progress_cycle_ms <= 0 {
            return Err(FleetError::Config("progress_cycle_ms must be positive".into()));
        }
        if self.eta_min_minutes < 1 {
            return Err(FleetError::Config(format!(
                "eta_min_minutes must be at least 1, got {}",
                self.eta_min_minutes
            )));
        }
        if self.eta_min_minutes > self.eta_max_minutes {
            return Err(FleetError::Config(format!(
                "eta range [{}, {}] is inverted",
                self.eta_min_minutes, self.eta_max_minutes
            )));
        }
        for (name, value) in [
            ("population_spread_deg", self.population_spread_deg),
            ("route_spread_deg", self.route_spread_deg),
            ("position_jitter_deg", self.position_jitter_deg),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(FleetError::Config(format!("{name} must be a non-negative number, got {value}")));
            }
        }
        if !(0.0..=1.0).contains(&self.route_advance_probability) {
            return Err(FleetError::Config("route_advance_probability must be in [0, 1]".into()));
        }
        if self.geofence_radius_km <= 0.0 {
            return Err(FleetError::Config("geofence_radius_km must be positive".into()));
        }
        Ok(())
    }
}
