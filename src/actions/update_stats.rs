//! Recompute and persist the movement/speed statistics of one trip.
//!
//! Read all samples, reduce, write once at the end. Collaborator errors
//! propagate unchanged; a failure anywhere aborts the update without
//! persisting partial stats.

use crate::connection::Connection;
use crate::error::{Result, TriplogError};
use crate::models::{PositionSample, Trip, TripStats};
use crate::queries::{PositionQuery, TripQuery};
use crate::stats;

// ---------------------------------------------------------------------------
// Collaborator interfaces
// ---------------------------------------------------------------------------

/// Data-access collaborator: supplies a trip's samples ordered ascending by
/// UTC timestamp.
pub trait SampleSource {
    fn samples(&self, trip_id: i64) -> Result<Vec<PositionSample>>;
}

/// Persistence collaborator: overwrites the stored stats of a trip.
pub trait StatsSink {
    fn save(&self, trip_id: i64, stats: &TripStats) -> Result<()>;
}

impl SampleSource for PositionQuery<'_> {
    fn samples(&self, trip_id: i64) -> Result<Vec<PositionSample>> {
        self.samples_by_trip(trip_id)
    }
}

impl StatsSink for TripQuery<'_> {
    fn save(&self, trip_id: i64, stats: &TripStats) -> Result<()> {
        self.save_stats(trip_id, stats)
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Recompute a trip's stats from the given collaborators and persist them.
///
/// Returns the freshly computed summary. The source and sink are explicit
/// parameters so callers can wire alternative storage (or test doubles)
/// without any ambient state.
pub fn update_trip_stats<S, K>(source: &S, sink: &K, trip_id: i64) -> Result<TripStats>
where
    S: SampleSource + ?Sized,
    K: StatsSink + ?Sized,
{
    let samples = source.samples(trip_id)?;
    let computed = stats::aggregate(&samples);
    sink.save(trip_id, &computed)?;
    Ok(computed)
}

/// [`update_trip_stats`] wired to one [`Connection`]'s query layer.
pub struct UpdateStats<'a> {
    conn: &'a Connection,
}

impl<'a> UpdateStats<'a> {
    /// Create a new `UpdateStats` action bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Recompute and persist the stats of `trip_id`, returning the updated
    /// trip row.
    pub fn run(&self, trip_id: i64) -> Result<Trip> {
        let positions = PositionQuery::new(self.conn);
        let trips = TripQuery::new(self.conn);

        update_trip_stats(&positions, &trips, trip_id)?;

        trips.get_by_id(trip_id)?.ok_or_else(|| {
            TriplogError::NotFound(format!("No trip with id {}", trip_id))
        })
    }
}
