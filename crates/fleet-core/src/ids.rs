//! Strongly typed driver identifier.
//!
//! Driver ids are opaque UUIDs.  They are generated from the engine's
//! injected [`SimRng`] rather than the OS, so a seeded run produces the same
//! ids every time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FleetError, SimRng};

/// Opaque unique identifier of a driver.  Serialized as a hyphenated UUID string.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub Uuid);

impl DriverId {
    /// A fresh v4 id drawn from `rng`.
    pub fn generate(rng: &mut SimRng) -> Self {
        let bytes = rng.random::<u128>().to_le_bytes();
        DriverId(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }

    /// A fresh v4 id drawn from the OS entropy source.
    pub fn new_v4() -> Self {
        DriverId(Uuid::new_v4())
    }
}

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for DriverId {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(DriverId)
            .map_err(|e| FleetError::Parse(format!("driver id {s:?}: {e}")))
    }
}
