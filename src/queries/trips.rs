//! Trip queries and writers against the DuckDB-backed telemetry tables.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{Result, TriplogError};
use crate::models::{Trip, TripStats};
use crate::sql_builder::SqlBuilder;

// ---------------------------------------------------------------------------
// SearchTripsParams
// ---------------------------------------------------------------------------

/// Parameters for the trip search.
///
/// All fields are optional. When `None`, the corresponding filter is skipped.
#[derive(Debug, Clone, Default)]
pub struct SearchTripsParams {
    pub name: Option<String>,
    pub device_id: Option<i64>,
    pub start_from: Option<DateTime<Utc>>,
    pub start_to: Option<DateTime<Utc>>,
    pub shared: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

// ---------------------------------------------------------------------------
// TripQuery
// ---------------------------------------------------------------------------

/// Query interface for trips backed by the `trips` table.
///
/// Also carries the trip writers: trips are the one table this SDK mutates
/// (derived stats and closing totals).
pub struct TripQuery<'a> {
    conn: &'a crate::connection::Connection,
}

impl<'a> TripQuery<'a> {
    /// Create a new `TripQuery` bound to the given connection.
    pub fn new(conn: &'a crate::connection::Connection) -> Self {
        Self { conn }
    }

    // -- Single trip lookup ------------------------------------------------

    /// Retrieve a single trip by its id.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Trip>> {
        self.conn.ensure_tables(&["trips"])?;

        let (sql, params) = SqlBuilder::new("trips")
            .where_eq("id", &id.to_string())
            .limit(1)
            .build();

        let rows: Vec<Trip> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.into_iter().next())
    }

    /// Retrieve a single trip by its share code.
    pub fn get_by_code(&self, code: &str) -> Result<Option<Trip>> {
        self.conn.ensure_tables(&["trips"])?;

        let (sql, params) = SqlBuilder::new("trips")
            .where_eq("code", code)
            .limit(1)
            .build();

        let rows: Vec<Trip> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.into_iter().next())
    }

    // -- Search ------------------------------------------------------------

    /// Search trips using a set of optional filters, newest first.
    pub fn search(&self, params: &SearchTripsParams) -> Result<Vec<Trip>> {
        self.conn.ensure_tables(&["trips"])?;

        let mut qb = SqlBuilder::new("trips");

        // -- name: if contains '%' use LIKE, otherwise exact match ----------
        if let Some(ref name) = params.name {
            if name.contains('%') {
                qb.where_like("name", name);
            } else {
                qb.where_eq("name", name);
            }
        }

        if let Some(device_id) = params.device_id {
            qb.where_eq("device_id", &device_id.to_string());
        }

        // Plain "YYYY-MM-DD HH:MM:SS" casts cleanly to TIMESTAMP
        if let Some(from) = params.start_from {
            qb.where_gte("start_utc_at", &from.naive_utc().to_string());
        }

        if let Some(to) = params.start_to {
            qb.where_lte("start_utc_at", &to.naive_utc().to_string());
        }

        if let Some(shared) = params.shared {
            qb.where_eq("shared", if shared { "true" } else { "false" });
        }

        qb.order_by(&["start_utc_at DESC"]);

        let limit = params.limit.unwrap_or(100);
        let offset = params.offset.unwrap_or(0);
        qb.limit(limit);
        qb.offset(offset);

        let (sql, sql_params) = qb.build();
        self.conn.execute_into(&sql, &sql_params)
    }

    /// Count trips, optionally filtered by the supplied column/value pairs.
    pub fn count(&self, filters: &HashMap<String, String>) -> Result<i64> {
        self.conn.ensure_tables(&["trips"])?;

        let mut qb = SqlBuilder::new("trips");
        qb.select(&["COUNT(*) AS cnt"]);

        for (col, val) in filters {
            qb.where_eq(col, val);
        }

        let (sql, params) = qb.build();
        let rows = self.conn.execute(&sql, &params)?;

        let cnt = rows
            .first()
            .and_then(|r| r.get("cnt"))
            .and_then(|v| v.as_i64())
            .unwrap_or(0);

        Ok(cnt)
    }

    // -- Writers -----------------------------------------------------------

    /// Overwrite the stored stats summary of a trip.
    ///
    /// The previous value is replaced wholesale; stats are derived data and
    /// never merged. Fails with `NotFound` when the trip does not exist, so
    /// a recomputation for a deleted trip surfaces instead of writing into
    /// the void.
    pub fn save_stats(&self, trip_id: i64, stats: &TripStats) -> Result<()> {
        self.conn.ensure_tables(&["trips"])?;

        let payload = serde_json::to_string(stats)?;
        let (sql, params) = SqlBuilder::new("trips")
            .set("stats", &payload)
            .where_eq("id", &trip_id.to_string())
            .build();

        let changed = self.conn.execute_update(&sql, &params)?;
        if changed == 0 {
            return Err(TriplogError::NotFound(format!(
                "No trip with id {} to store stats on",
                trip_id
            )));
        }
        Ok(())
    }

    /// Update the closing totals of a trip (distance in km, time in seconds).
    pub fn update_totals(&self, trip_id: i64, distance: f64, time: i64) -> Result<()> {
        self.conn.ensure_tables(&["trips"])?;

        // "time" needs quoting: DuckDB reads the bare word as the type name
        let (sql, params) = SqlBuilder::new("trips")
            .set("distance", &distance.to_string())
            .set("\"time\"", &time.to_string())
            .where_eq("id", &trip_id.to_string())
            .build();

        let changed = self.conn.execute_update(&sql, &params)?;
        if changed == 0 {
            return Err(TriplogError::NotFound(format!(
                "No trip with id {} to store totals on",
                trip_id
            )));
        }
        Ok(())
    }
}
