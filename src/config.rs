use std::collections::HashMap;
use std::path::PathBuf;

pub const EXPORT_BASE: &str = "https://demo.triplog.app/export/v1";
pub const META_URL: &str = "https://demo.triplog.app/export/v1/Meta.json";

/// Database file name inside the data directory (ignored in in-memory mode).
pub const DATABASE_FILE: &str = "triplog.duckdb";

/// NDJSON export files backing the relational tables.
pub fn export_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("trips", "ndjson/trips.ndjson"),
        ("positions", "ndjson/positions.ndjson"),
    ])
}

/// Plain JSON documents (reference data, not tables).
pub fn json_files() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("languages", "languages.json"),
        ("meta", "Meta.json"),
    ])
}

/// Columns that must be cast to TIMESTAMP when a table is loaded.
///
/// Exports carry datetimes as ISO-8601 strings; casting at load time keeps
/// ORDER BY and range filters on the typed column instead of on text.
pub fn timestamp_columns() -> HashMap<&'static str, &'static [&'static str]> {
    HashMap::from([
        ("trips", &["start_utc_at", "end_utc_at"] as &[&str]),
        ("positions", &["date_utc_at"] as &[&str]),
    ])
}

pub fn default_data_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("triplog-sdk")
    } else {
        PathBuf::from(".triplog-sdk-data")
    }
}
