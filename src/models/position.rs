use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Position -- one timestamped GPS reading belonging to a trip
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    pub trip_id: i64,
    pub device_id: i64,

    pub latitude: f64,
    pub longitude: f64,

    /// Speed in km/h as reported by the device. Non-negative.
    pub speed: f64,
    /// Heading in degrees, when the device reports one.
    pub direction: Option<f64>,
    /// GSM signal quality, when the device reports one.
    pub signal: Option<i64>,

    /// Device-local wall clock, kept verbatim as reported.
    pub date_at: String,
    pub date_utc_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// PositionSample -- the slim projection the stats aggregation consumes
// ---------------------------------------------------------------------------

/// Speed + UTC timestamp projection of a position row.
///
/// The stats reducer only needs these two columns, so the query layer selects
/// them alone. Samples are ordered ascending by `date_utc_at`; that ordering
/// is the supplier's contract, not re-checked here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub speed: f64,
    pub date_utc_at: DateTime<Utc>,
}
