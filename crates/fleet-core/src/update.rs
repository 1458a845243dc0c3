//! A confirmed change to one driver's position, status, and ETA.

use serde::{Deserialize, Serialize};

use crate::{DriverId, DriverStatus, GeoPoint, Timestamp};

/// Produced by the position simulator, carried on the wire inside an update
/// message, and applied by the driver store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverUpdate {
    pub driver_id: DriverId,
    pub latitude:  f64,
    pub longitude: f64,
    pub status:    DriverStatus,
    pub eta:       Timestamp,
}

impl DriverUpdate {
    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
