//! Read-only queries over the store: search, counts, geofence.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use fleet_core::GeoPoint;

use crate::{Driver, DriverStateStore};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Name,
    Status,
    Eta,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc  => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Header figures: drivers currently delivering, and all drivers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FleetCounts {
    pub active: usize,
    pub total:  usize,
}

fn compare(a: &Driver, b: &Driver, field: SortField) -> Ordering {
    match field {
        SortField::Name   => a.name.cmp(&b.name),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::Eta    => a.eta.cmp(&b.eta),
    }
}

impl DriverStateStore {
    /// Drivers whose name or status contains `query` (case-insensitive),
    /// stably sorted by `field` in `order`.  An empty query matches all.
    pub fn search_and_sort(&self, query: &str, field: SortField, order: SortOrder) -> Vec<&Driver> {
        let needle = query.to_lowercase();
        let mut hits: Vec<&Driver> = self
            .iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&needle) || d.status.as_str().contains(&needle)
            })
            .collect();
        hits.sort_by(|a, b| {
            let ord = compare(a, b, field);
            match order {
                SortOrder::Asc  => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
        hits
    }

    pub fn counts(&self) -> FleetCounts {
        FleetCounts {
            active: self.iter().filter(|d| d.is_delivering()).count(),
            total:  self.len(),
        }
    }

    /// Drivers within `radius_km` (haversine) of `center`.
    pub fn within_geofence(&self, center: GeoPoint, radius_km: f64) -> Vec<&Driver> {
        self.iter()
            .filter(|d| d.position().within_radius_km(center, radius_km))
            .collect()
    }
}
