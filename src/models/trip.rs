use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::stats::TripStats;

// ---------------------------------------------------------------------------
// Trip -- a recorded journey owning a derived stats summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub device_id: i64,

    /// Total distance in kilometers, filled once the trip is closed.
    pub distance: Option<f64>,
    /// Total duration in seconds, filled once the trip is closed.
    pub time: Option<i64>,

    pub start_utc_at: DateTime<Utc>,
    pub end_utc_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub shared_public: bool,

    /// Derived movement/speed summary, overwritten by the stats action.
    /// The database stores it as a JSON text column, so this accepts both
    /// an embedded object and a JSON-encoded string.
    #[serde(default, deserialize_with = "stats_column")]
    pub stats: Option<TripStats>,
}

/// Deserialize the `stats` column from either a JSON object or the
/// JSON-encoded string DuckDB hands back for VARCHAR columns.
fn stats_column<'de, D>(deserializer: D) -> Result<Option<TripStats>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => {
            if s.trim().is_empty() {
                return Ok(None);
            }
            serde_json::from_str(&s).map(Some).map_err(serde::de::Error::custom)
        }
        Some(other) => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
