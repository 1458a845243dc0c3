//! Driver status enum shared by the simulator, the store, and the wire format.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::FleetError;

/// What a driver is currently doing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverStatus {
    /// No delivery assigned (default state).
    #[default]
    Idle,
    /// On a delivery; the only status that moves.
    Delivering,
    /// Delivery assigned but on hold.
    Paused,
}

impl DriverStatus {
    /// Every status, in the order random draws index into.
    pub const ALL: [DriverStatus; 3] = [
        DriverStatus::Delivering,
        DriverStatus::Paused,
        DriverStatus::Idle,
    ];

    #[inline]
    pub fn is_delivering(self) -> bool {
        matches!(self, DriverStatus::Delivering)
    }

    /// Wire / display label.
    pub fn as_str(self) -> &'static str {
        match self {
            DriverStatus::Idle       => "idle",
            DriverStatus::Delivering => "delivering",
            DriverStatus::Paused     => "paused",
        }
    }
}

impl std::fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for DriverStatus {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idle"       => Ok(DriverStatus::Idle),
            "delivering" => Ok(DriverStatus::Delivering),
            "paused"     => Ok(DriverStatus::Paused),
            other        => Err(FleetError::Parse(format!("unknown driver status {other:?}"))),
        }
    }
}
