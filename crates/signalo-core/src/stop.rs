//! Transit stop domain model.
//!
//! Stops are read-only reference data: fetched fresh per session or screen
//! visit, never cached beyond a re-fetch.

use serde::{Deserialize, Serialize};

/// A transit stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Codes of the routes serving this stop.
    #[serde(default)]
    pub route_codes: Vec<String>,
}

/// A stop returned by the proximity query, with its server-computed
/// distance from the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyStop {
    pub stop: Stop,
    /// Distance from the queried location, in kilometres.
    pub distance_km: f64,
}

impl NearbyStop {
    /// Distance rounded to the nearest whole metre.
    pub fn distance_meters(&self) -> i64 {
        (self.distance_km * 1000.0).round() as i64
    }

    /// Display label, e.g. `"345 m"` for a server distance of 0.345 km.
    pub fn distance_label(&self) -> String {
        format!("{} m", self.distance_meters())
    }
}

/// Case-insensitive substring filter over an already-fetched stop list.
///
/// An empty query matches everything. The nearby-stop set is a separate
/// data set and is never derived from this filter.
pub fn filter_stops<'a>(stops: &'a [Stop], query: &str) -> Vec<&'a Stop> {
    let needle = query.to_lowercase();
    stops
        .iter()
        .filter(|stop| stop.name.to_lowercase().contains(&needle))
        .collect()
}
