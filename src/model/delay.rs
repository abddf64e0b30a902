use chrono::{DateTime, FixedOffset, Utc};

use serde::{Deserialize, Serialize};
use serde_aux::prelude::deserialize_default_from_null;

/// One run of the collection job: every trip currently running abnormally.
///
/// The snapshot is produced by another process, so only the trip ids are
/// required. Anything else it leaves out reads as zero or empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayFeed {
    #[serde(default)]
    pub count: usize,
    #[serde(default, deserialize_with = "deserialize_default_from_null")]
    pub trips: Vec<DelayedTrip>,
    #[serde(default)]
    pub exec_name: String,
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub valid_until: i64,
}

impl DelayFeed {
    /// Replace the trip list, keeping `count` in step with it
    pub fn with_trips(self, trips: Vec<DelayedTrip>) -> Self {
        Self {
            count: trips.len(),
            trips,
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedTrip {
    pub trip_id: String,
    #[serde(default)]
    pub route_id: String,
    #[serde(default)]
    pub route_long_name: String,
    #[serde(default)]
    pub route_short_name: String,
    #[serde(default)]
    pub next_stop: NextStop,
    #[serde(default)]
    pub vehicle_id: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lon: f64,
}

/// Where a delayed vehicle stops next and how late it is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextStop {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub scheduled_arrival: DateTime<FixedOffset>,
    pub eta: DateTime<FixedOffset>,
    /// Seconds behind schedule
    pub delay: i64,
}

impl Default for NextStop {
    fn default() -> Self {
        let epoch: DateTime<FixedOffset> = DateTime::<Utc>::default().into();
        Self {
            id: String::new(),
            name: String::new(),
            lat: 0.0,
            lon: 0.0,
            scheduled_arrival: epoch,
            eta: epoch,
            delay: 0,
        }
    }
}
