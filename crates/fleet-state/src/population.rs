//! Synthetic driver populations.

use fleet_core::{DriverId, DriverStatus, EngineConfig, EtaRange, GeoPoint, SimRng, Timestamp};

use crate::Driver;

const FIRST_NAMES: &[&str] = &[
    "Ava", "Ben", "Chloe", "Daniel", "Elena", "Farah", "Gavin", "Hana", "Isaac", "Jade",
    "Kofi", "Lena", "Marco", "Nadia", "Owen", "Priya", "Quinn", "Rosa", "Sami", "Tariq",
    "Uma", "Victor", "Wren", "Yusuf", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Barnes", "Chen", "Doyle", "Evans", "Fitzgerald", "Garcia", "Hughes", "Ivanova",
    "Jensen", "Kowalski", "Lopez", "Murphy", "Nguyen", "O'Brien", "Patel", "Quigley", "Reid",
    "Singh", "Tremblay", "Walsh", "Young",
];

/// Generates a population of drivers scattered around a base coordinate.
#[derive(Debug, Clone, Copy)]
pub struct PopulationGenerator {
    pub base:       GeoPoint,
    /// Half-width, in degrees, of the uniform scatter around `base`.
    pub spread_deg: f64,
    pub eta_range:  EtaRange,
}

impl PopulationGenerator {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            base:       config.base,
            spread_deg: config.population_spread_deg,
            eta_range:  config.eta_range(),
        }
    }

    /// `count` drivers with fresh ids, random names, positions within
    /// `spread_deg` of `base`, uniformly drawn statuses, and ETAs in the
    /// configured window after `now`.
    pub fn generate(&self, count: usize, now: Timestamp, rng: &mut SimRng) -> Vec<Driver> {
        (0..count).map(|_| self.one(now, rng)).collect()
    }

    fn one(&self, now: Timestamp, rng: &mut SimRng) -> Driver {
        let id       = DriverId::generate(rng);
        let name     = random_name(rng);
        let position = self.base.offset(rng.symmetric(self.spread_deg), rng.symmetric(self.spread_deg));
        let status   = *rng.choose(&DriverStatus::ALL).unwrap_or(&DriverStatus::Idle);
        let eta      = self.eta_range.sample(now, rng);
        Driver::new(id, name, position, status, eta, now)
    }
}

impl Default for PopulationGenerator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

fn random_name(rng: &mut SimRng) -> String {
    let first = rng.choose(FIRST_NAMES).copied().unwrap_or("Driver");
    let last  = rng.choose(LAST_NAMES).copied().unwrap_or("Unknown");
    format!("{first} {last}")
}
