use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TripStats -- derived movement/speed summary, stored 1:1 on the trip row
// ---------------------------------------------------------------------------

/// Derived statistics for one trip.
///
/// Created fresh per aggregation run and overwritten wholesale on the trip
/// row; never merged with a previous value. All fields default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TripStats {
    #[serde(default)]
    pub speed: SpeedStats,
    #[serde(default)]
    pub time: TimeStats,
}

/// Speed summary over all position samples of a trip.
///
/// Percentage fields are relative to `max` and stay at zero when `max` is
/// zero (an all-stopped trip has nothing to express them against).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SpeedStats {
    #[serde(default)]
    pub max: f64,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub avg: f64,

    #[serde(default)]
    pub max_percent: i64,
    #[serde(default)]
    pub min_percent: i64,
    #[serde(default)]
    pub avg_percent: i64,
}

/// Elapsed-time summary in seconds, split into movement and stopped shares.
///
/// Percentage fields are relative to `total` and stay at zero when `total`
/// is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimeStats {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub movement: i64,
    #[serde(default)]
    pub stopped: i64,

    #[serde(default)]
    pub total_percent: i64,
    #[serde(default)]
    pub movement_percent: i64,
    #[serde(default)]
    pub stopped_percent: i64,
}
