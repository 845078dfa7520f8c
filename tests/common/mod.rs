//! Shared test fixtures for the Triplog SDK integration tests.
//!
//! Provides `setup_sample_db()` which creates an in-memory DuckDB connection
//! populated with small sample tables (trips, positions) via NDJSON temp
//! files, plus the JSON documents (languages, meta) in a temporary data
//! directory.

use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use triplog_sdk::{Connection, StoreManager};

/// Create a `Connection` backed by a temporary data directory with sample
/// data loaded into DuckDB tables via NDJSON temp files.
///
/// Returns `(Connection, tempfile::TempDir)`. The caller must keep the
/// `TempDir` alive for the duration of the test so the data directory is not
/// deleted prematurely.
pub fn setup_sample_db() -> (Connection, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    write_documents(tmp_dir.path());

    let store =
        StoreManager::new(Some(tmp_dir.path().to_path_buf()), true, Duration::from_secs(30))
            .unwrap();
    let conn = Connection::new(store, true).unwrap();

    // -- trips table ----------------------------------------------------------
    register_trips(&conn);

    // -- positions table ------------------------------------------------------
    register_positions(&conn);

    (conn, tmp_dir)
}

/// Sample trips:
/// 1. "Morning commute" -- mixed moving/stopped trail (device 1, shared)
/// 2. "Parking idle" -- all-zero speeds, carries stale stats to overwrite
/// 3. "Quick errand" -- a single position sample (device 2)
/// 4. "Highway run" -- constant nonzero speed (device 2)
/// 5. "Draft route" -- no positions recorded yet
fn register_trips(conn: &Connection) {
    let stale_stats = serde_json::json!({
        "speed": {
            "max": 99.0, "min": 1.0, "avg": 50.0,
            "max_percent": 100, "min_percent": 1, "avg_percent": 51
        },
        "time": {
            "total": 600, "movement": 600, "stopped": 0,
            "total_percent": 100, "movement_percent": 100, "stopped_percent": 0
        }
    });

    let trips = vec![
        serde_json::json!({
            "id": 1,
            "code": "TRIP0001",
            "name": "Morning commute",
            "device_id": 1,
            "distance": 12.5,
            "time": 120,
            "start_utc_at": "2024-05-04 10:00:00",
            "end_utc_at": "2024-05-04 10:02:00",
            "shared": true,
            "shared_public": false,
            "stats": null
        }),
        serde_json::json!({
            "id": 2,
            "code": "TRIP0002",
            "name": "Parking idle",
            "device_id": 1,
            "distance": null,
            "time": null,
            "start_utc_at": "2024-05-04 11:00:00",
            "end_utc_at": "2024-05-04 11:02:00",
            "shared": false,
            "shared_public": false,
            "stats": serde_json::to_string(&stale_stats).unwrap()
        }),
        serde_json::json!({
            "id": 3,
            "code": "TRIP0003",
            "name": "Quick errand",
            "device_id": 2,
            "distance": null,
            "time": null,
            "start_utc_at": "2024-05-05 09:30:00",
            "end_utc_at": null,
            "shared": false,
            "shared_public": false,
            "stats": null
        }),
        serde_json::json!({
            "id": 4,
            "code": "TRIP0004",
            "name": "Highway run",
            "device_id": 2,
            "distance": null,
            "time": null,
            "start_utc_at": "2024-05-05 14:00:00",
            "end_utc_at": "2024-05-05 14:01:30",
            "shared": false,
            "shared_public": false,
            "stats": null
        }),
        serde_json::json!({
            "id": 5,
            "code": "TRIP0005",
            "name": "Draft route",
            "device_id": 2,
            "distance": null,
            "time": null,
            "start_utc_at": "2024-05-06 08:00:00",
            "end_utc_at": null,
            "shared": false,
            "shared_public": false,
            "stats": null
        }),
    ];

    write_ndjson_and_register(conn, "trips", &trips);
}

fn register_positions(conn: &Connection) {
    let positions = vec![
        // Trip 1: stopped -> moving -> stopped, one sample per minute
        position(1, 1, 1, 0.0, "2024-05-04 10:00:00"),
        position(2, 1, 1, 10.0, "2024-05-04 10:01:00"),
        position(3, 1, 1, 0.0, "2024-05-04 10:02:00"),
        // Trip 2: parked, never moves
        position(4, 2, 1, 0.0, "2024-05-04 11:00:00"),
        position(5, 2, 1, 0.0, "2024-05-04 11:01:00"),
        position(6, 2, 1, 0.0, "2024-05-04 11:02:00"),
        // Trip 3: a single reading
        position(7, 3, 2, 50.0, "2024-05-05 09:30:00"),
        // Trip 4: constant speed, one sample every 30 seconds
        position(8, 4, 2, 40.0, "2024-05-05 14:00:00"),
        position(9, 4, 2, 40.0, "2024-05-05 14:00:30"),
        position(10, 4, 2, 40.0, "2024-05-05 14:01:00"),
        position(11, 4, 2, 40.0, "2024-05-05 14:01:30"),
    ];

    write_ndjson_and_register(conn, "positions", &positions);
}

fn position(
    id: i64,
    trip_id: i64,
    device_id: i64,
    speed: f64,
    date_utc_at: &str,
) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "trip_id": trip_id,
        "device_id": device_id,
        "latitude": 40.4168 + id as f64 * 0.0001,
        "longitude": -3.7038 - id as f64 * 0.0001,
        "speed": speed,
        "direction": 90.0,
        "signal": 4,
        "date_at": date_utc_at,
        "date_utc_at": date_utc_at
    })
}

/// Write the JSON documents (languages, meta) into the data directory so the
/// offline store can serve them without downloading.
fn write_documents(data_dir: &Path) {
    let languages = serde_json::json!({
        "data": [
            { "id": 1, "code": "en", "iso": "en", "name": "English", "default": true },
            { "id": 2, "code": "es", "iso": "es", "name": "Español", "default": false }
        ]
    });
    std::fs::write(
        data_dir.join("languages.json"),
        serde_json::to_string(&languages).unwrap(),
    )
    .unwrap();

    let meta = serde_json::json!({
        "data": {
            "exported_at": "2026-08-01T04:00:00Z",
            "tables": { "trips": 5, "positions": 11 }
        }
    });
    std::fs::write(
        data_dir.join("Meta.json"),
        serde_json::to_string(&meta).unwrap(),
    )
    .unwrap();
}

/// Write a slice of JSON values as NDJSON to a temp file and register it
/// as a DuckDB table via `Connection::register_table_from_ndjson`.
pub fn write_ndjson_and_register(
    conn: &Connection,
    table_name: &str,
    rows: &[serde_json::Value],
) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    conn.register_table_from_ndjson(table_name, path).unwrap();
    // NamedTempFile is dropped here, but DuckDB has already read the data
    // into an in-memory table, so this is fine.
}
