//! The `Driver` entity.

use fleet_core::{DriverId, DriverStatus, DriverUpdate, GeoPoint, LngLat, Timestamp};
use serde::{Deserialize, Serialize};

/// One tracked driver.
///
/// Serialized field names match the update wire format (`camelCase`), so a
/// persisted snapshot reads the same as what a browser client would store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id:            DriverId,
    pub name:          String,
    pub latitude:      f64,
    pub longitude:     f64,
    pub status:        DriverStatus,
    pub eta:           Timestamp,
    pub last_updated:  Timestamp,
    /// Chronological `[lng, lat]` trail.  Seeded with the initial position and
    /// never shrinks.
    pub route_history: Vec<LngLat>,
}

impl Driver {
    /// A driver whose history holds exactly its starting position.
    pub fn new(
        id:       DriverId,
        name:     impl Into<String>,
        position: GeoPoint,
        status:   DriverStatus,
        eta:      Timestamp,
        now:      Timestamp,
    ) -> Self {
        Self {
            id,
            name:          name.into(),
            latitude:      position.lat,
            longitude:     position.lon,
            status,
            eta,
            last_updated:  now,
            route_history: vec![position.to_lng_lat()],
        }
    }

    #[inline]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    #[inline]
    pub fn is_delivering(&self) -> bool {
        self.status.is_delivering()
    }

    pub fn last_point(&self) -> Option<LngLat> {
        self.route_history.last().copied()
    }

    /// Overwrite position, status and ETA from `update`.  `lastUpdated` moves
    /// to `now`, or one millisecond past its previous value if the clock has
    /// not advanced.  Returns `true` if a history point was appended.
    pub(crate) fn apply_update(&mut self, update: &DriverUpdate, now: Timestamp) -> bool {
        self.latitude  = update.latitude;
        self.longitude = update.longitude;
        self.status    = update.status;
        self.eta       = update.eta;
        self.touch(now);
        self.is_delivering() && self.record_position(update.position())
    }

    /// Move to `position` and append it to the history if it differs from the
    /// last recorded point.
    pub(crate) fn move_to(&mut self, position: GeoPoint, now: Timestamp) -> bool {
        self.latitude  = position.lat;
        self.longitude = position.lon;
        self.touch(now);
        self.record_position(position)
    }

    pub(crate) fn touch(&mut self, now: Timestamp) {
        self.last_updated = now.max(self.last_updated + 1);
    }

    fn record_position(&mut self, position: GeoPoint) -> bool {
        let point = position.to_lng_lat();
        if self.last_point() == Some(point) {
            return false;
        }
        self.route_history.push(point);
        true
    }
}
