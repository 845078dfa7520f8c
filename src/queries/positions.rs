//! Position queries against the DuckDB-backed telemetry tables.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Position, PositionSample};
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// PositionQuery
// ---------------------------------------------------------------------------

/// Query interface for GPS positions backed by the `positions` table.
pub struct PositionQuery<'a> {
    conn: &'a crate::connection::Connection,
}

impl<'a> PositionQuery<'a> {
    /// Create a new `PositionQuery` bound to the given connection.
    pub fn new(conn: &'a crate::connection::Connection) -> Self {
        Self { conn }
    }

    // -- Single row lookup -------------------------------------------------

    /// Retrieve a single position by its id.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Position>> {
        self.conn.ensure_tables(&["positions"])?;

        let (sql, params) = SqlBuilder::new("positions")
            .where_eq("id", &id.to_string())
            .limit(1)
            .build();

        let rows: Vec<Position> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.into_iter().next())
    }

    // -- Trip trail --------------------------------------------------------

    /// All positions of a trip, ordered ascending by UTC timestamp.
    pub fn by_trip(&self, trip_id: i64) -> Result<Vec<Position>> {
        self.conn.ensure_tables(&["positions"])?;

        let (sql, params) = SqlBuilder::new("positions")
            .where_eq("trip_id", &trip_id.to_string())
            .order_by(&["date_utc_at ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }

    /// The speed/timestamp projection of a trip's trail, ordered ascending
    /// by UTC timestamp.
    ///
    /// This is the input contract of the stats reducer: only the two columns
    /// it needs, in the order it requires.
    pub fn samples_by_trip(&self, trip_id: i64) -> Result<Vec<PositionSample>> {
        self.conn.ensure_tables(&["positions"])?;

        let (sql, params) = SqlBuilder::new("positions")
            .select(&["speed", "date_utc_at"])
            .where_eq("trip_id", &trip_id.to_string())
            .order_by(&["date_utc_at ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }

    /// Count the positions recorded for a trip.
    pub fn count_by_trip(&self, trip_id: i64) -> Result<i64> {
        self.conn.ensure_tables(&["positions"])?;

        let (sql, params) = SqlBuilder::new("positions")
            .select(&["COUNT(*) AS cnt"])
            .where_eq("trip_id", &trip_id.to_string())
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        let cnt = rows
            .first()
            .and_then(|r| r.get("cnt"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        Ok(cnt)
    }

    // -- Time bounds -------------------------------------------------------

    /// First and last sample timestamps of a trip, or `None` when the trip
    /// has no positions.
    pub fn date_range(&self, trip_id: i64) -> Result<Option<(DateTime<Utc>, DateTime<Utc>)>> {
        self.conn.ensure_tables(&["positions"])?;

        let sql = r#"
            SELECT MIN(date_utc_at) AS first_at, MAX(date_utc_at) AS last_at
            FROM positions
            WHERE trip_id = ?
        "#;

        let rows = self.conn.execute(sql, &[trip_id.to_string()])?;
        let row = match rows.first() {
            Some(r) => r,
            None => return Ok(None),
        };

        let first = row.get("first_at").and_then(|v| v.as_str());
        let last = row.get("last_at").and_then(|v| v.as_str());

        match (first, last) {
            (Some(first), Some(last)) => {
                let first = DateTime::parse_from_rfc3339(first)?.with_timezone(&Utc);
                let last = DateTime::parse_from_rfc3339(last)?.with_timezone(&Utc);
                Ok(Some((first, last)))
            }
            _ => Ok(None),
        }
    }

    // -- Device feeds ------------------------------------------------------

    /// Most recent position reported by a device, across all its trips.
    pub fn latest_by_device(&self, device_id: i64) -> Result<Option<Position>> {
        self.conn.ensure_tables(&["positions"])?;

        let (sql, params) = SqlBuilder::new("positions")
            .where_eq("device_id", &device_id.to_string())
            .order_by(&["date_utc_at DESC"])
            .limit(1)
            .build();

        let rows: Vec<Position> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.into_iter().next())
    }
}
