//! Synthetic trip generator for demos and smoke tests.
//!
//! Produces a plausible position trail: driving phases with drifting speed,
//! stop phases at zero, one sample every 30 seconds, coordinates following a
//! small random walk. Creates the telemetry tables if the database is empty,
//! so a fresh in-memory connection can be seeded without any export files.

use crate::connection::Connection;
use crate::error::Result;
use chrono::{Duration, Utc};
use rand::prelude::*;

const SAMPLE_INTERVAL_SECS: i64 = 30;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS trips (
    id BIGINT,
    code VARCHAR,
    name VARCHAR,
    device_id BIGINT,
    distance DOUBLE,
    "time" BIGINT,
    start_utc_at TIMESTAMP,
    end_utc_at TIMESTAMP,
    shared BOOLEAN,
    shared_public BOOLEAN,
    stats VARCHAR
);
CREATE TABLE IF NOT EXISTS positions (
    id BIGINT,
    trip_id BIGINT,
    device_id BIGINT,
    latitude DOUBLE,
    longitude DOUBLE,
    speed DOUBLE,
    direction DOUBLE,
    signal BIGINT,
    date_at VARCHAR,
    date_utc_at TIMESTAMP
);
"#;

/// Inserts synthetic trips with random-walk position trails.
pub struct TripSeeder<'a> {
    conn: &'a Connection,
}

impl<'a> TripSeeder<'a> {
    /// Create a new `TripSeeder` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert one synthetic trip with `sample_count` positions for
    /// `device_id` and return the new trip id.
    ///
    /// The trail alternates driving and stop phases, ends at the current
    /// time, and leaves the trip's `stats` column empty -- run the stats
    /// action afterwards to fill it.
    pub fn seed_trip(&self, device_id: i64, sample_count: usize) -> Result<i64> {
        self.ensure_schema()?;

        let mut rng = thread_rng();

        let trip_id = self.next_id("trips")?;
        let position_id = self.next_id("positions")?;
        let code = share_code(&mut rng);

        let total_secs = SAMPLE_INTERVAL_SECS * sample_count.saturating_sub(1) as i64;
        let end_at = Utc::now();
        let start_at = end_at - Duration::seconds(total_secs);

        self.conn.execute_update(
            "INSERT INTO trips \
             (id, code, name, device_id, distance, \"time\", start_utc_at, end_utc_at, \
              shared, shared_public, stats) \
             VALUES (?, ?, ?, ?, NULL, NULL, ?, ?, false, false, NULL)",
            &[
                trip_id.to_string(),
                code.clone(),
                format!("Demo trip {}", code),
                device_id.to_string(),
                // Plain "YYYY-MM-DD HH:MM:SS" casts cleanly to TIMESTAMP
                start_at.naive_utc().to_string(),
                end_at.naive_utc().to_string(),
            ],
        )?;

        // Random walk around a fixed origin
        let mut latitude = 40.0 + rng.gen_range(-0.5..0.5);
        let mut longitude = -3.7 + rng.gen_range(-0.5..0.5);

        // Alternating phases: driving with drifting speed, stopped at zero
        let mut driving = true;
        let mut phase_left = rng.gen_range(5..15);
        let mut speed = rng.gen_range(25.0..60.0f64);

        for i in 0..sample_count {
            if phase_left == 0 {
                driving = !driving;
                phase_left = rng.gen_range(3..12);
                if driving {
                    speed = rng.gen_range(25.0..60.0);
                }
            }
            phase_left -= 1;

            let sample_speed = if driving {
                speed = (speed + rng.gen_range(-5.0..5.0)).clamp(5.0, 120.0);
                (speed * 100.0).round() / 100.0
            } else {
                0.0
            };

            if driving {
                latitude += rng.gen_range(-0.001..0.001);
                longitude += rng.gen_range(-0.001..0.001);
            }

            let at = start_at + Duration::seconds(SAMPLE_INTERVAL_SECS * i as i64);

            self.conn.execute_update(
                "INSERT INTO positions \
                 (id, trip_id, device_id, latitude, longitude, speed, direction, signal, \
                  date_at, date_utc_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    (position_id + i as i64).to_string(),
                    trip_id.to_string(),
                    device_id.to_string(),
                    latitude.to_string(),
                    longitude.to_string(),
                    sample_speed.to_string(),
                    rng.gen_range(0.0..360.0f64).round().to_string(),
                    rng.gen_range(1..5).to_string(),
                    at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    at.naive_utc().to_string(),
                ],
            )?;
        }

        Ok(trip_id)
    }

    /// Create the telemetry tables when they do not exist yet and adopt them
    /// into the connection's table registry.
    fn ensure_schema(&self) -> Result<()> {
        self.conn.raw().execute_batch(SCHEMA)?;
        self.conn.ensure_tables(&["trips", "positions"])?;
        Ok(())
    }

    /// Next free id for a table (max + 1, starting at 1).
    fn next_id(&self, table: &str) -> Result<i64> {
        let value = self
            .conn
            .execute_scalar(&format!("SELECT MAX(id) FROM {}", table), &[])?;
        let max = value.and_then(|v| v.as_i64()).unwrap_or(0);
        Ok(max + 1)
    }
}

// ---------------------------------------------------------------------------
// Free-standing helpers
// ---------------------------------------------------------------------------

/// Random 8-character share code, uppercase alphanumeric.
fn share_code(rng: &mut ThreadRng) -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
