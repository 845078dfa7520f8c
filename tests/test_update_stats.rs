//! Stats-update action tests against in-memory sample data.

mod common;

use std::cell::RefCell;

use chrono::{Duration, TimeZone, Utc};
use triplog_sdk::actions::{update_trip_stats, SampleSource, StatsSink, UpdateStats};
use triplog_sdk::error::{Result, TriplogError};
use triplog_sdk::models::{PositionSample, TripStats};
use triplog_sdk::queries::TripQuery;

// ---------------------------------------------------------------------------
// End-to-end against the sample database
// ---------------------------------------------------------------------------

#[test]
fn run_computes_and_persists_stats() {
    let (conn, _tmp) = common::setup_sample_db();

    let trip = UpdateStats::new(&conn).run(1).unwrap();

    let stats = trip.stats.expect("stats should be persisted on the trip");
    assert_eq!(stats.speed.max, 10.0);
    assert_eq!(stats.speed.avg, 3.33);
    assert_eq!(stats.speed.max_percent, 100);
    assert_eq!(stats.speed.avg_percent, 33);
    assert_eq!(stats.time.movement, 60);
    assert_eq!(stats.time.stopped, 60);
    assert_eq!(stats.time.total, 120);
    assert_eq!(stats.time.movement_percent, 50);
    assert_eq!(stats.time.stopped_percent, 50);

    // And the row is really updated, not just the returned value
    let reread = TripQuery::new(&conn).get_by_id(1).unwrap().unwrap();
    assert_eq!(reread.stats, Some(stats));
}

#[test]
fn run_overwrites_previous_stats() {
    let (conn, _tmp) = common::setup_sample_db();

    // Trip 2 ships with stale stats claiming movement; it never moved
    let before = TripQuery::new(&conn).get_by_id(2).unwrap().unwrap();
    assert_eq!(before.stats.unwrap().speed.max, 99.0);

    let trip = UpdateStats::new(&conn).run(2).unwrap();

    let stats = trip.stats.unwrap();
    assert_eq!(stats.speed.max, 0.0);
    assert_eq!(stats.speed.max_percent, 0);
    assert_eq!(stats.time.movement, 0);
    assert_eq!(stats.time.stopped, 120);
    assert_eq!(stats.time.stopped_percent, 100);
}

#[test]
fn run_fails_for_unknown_trip() {
    let (conn, _tmp) = common::setup_sample_db();

    let err = UpdateStats::new(&conn).run(99).unwrap_err();
    assert!(matches!(err, TriplogError::NotFound(_)));
}

#[test]
fn run_persists_zeroed_stats_for_trip_without_positions() {
    let (conn, _tmp) = common::setup_sample_db();

    let trip = UpdateStats::new(&conn).run(5).unwrap();

    assert_eq!(trip.stats, Some(TripStats::default()));
}

#[test]
fn run_on_single_sample_trip_leaves_time_at_zero() {
    let (conn, _tmp) = common::setup_sample_db();

    let trip = UpdateStats::new(&conn).run(3).unwrap();

    let stats = trip.stats.unwrap();
    assert_eq!(stats.time.total, 0);
    assert_eq!(stats.time.total_percent, 0);
    assert_eq!(stats.speed.max, 50.0);
    assert_eq!(stats.speed.max_percent, 100);
}

// ---------------------------------------------------------------------------
// Generic entry point with explicit collaborators
// ---------------------------------------------------------------------------

struct FixedSource(Vec<PositionSample>);

impl SampleSource for FixedSource {
    fn samples(&self, _trip_id: i64) -> Result<Vec<PositionSample>> {
        Ok(self.0.clone())
    }
}

struct RecordingSink(RefCell<Vec<(i64, TripStats)>>);

impl StatsSink for RecordingSink {
    fn save(&self, trip_id: i64, stats: &TripStats) -> Result<()> {
        self.0.borrow_mut().push((trip_id, stats.clone()));
        Ok(())
    }
}

struct FailingSink;

impl StatsSink for FailingSink {
    fn save(&self, _trip_id: i64, _stats: &TripStats) -> Result<()> {
        Err(TriplogError::InvalidArgument("sink unavailable".into()))
    }
}

fn fixed_trail() -> Vec<PositionSample> {
    let start = Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, 0).unwrap();
    vec![
        PositionSample { speed: 0.0, date_utc_at: start },
        PositionSample { speed: 10.0, date_utc_at: start + Duration::seconds(60) },
        PositionSample { speed: 0.0, date_utc_at: start + Duration::seconds(120) },
    ]
}

#[test]
fn generic_entry_point_writes_through_the_sink() {
    let source = FixedSource(fixed_trail());
    let sink = RecordingSink(RefCell::new(Vec::new()));

    let stats = update_trip_stats(&source, &sink, 7).unwrap();

    let saved = sink.0.borrow();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, 7);
    assert_eq!(saved[0].1, stats);
    assert_eq!(stats.time.movement_percent, 50);
}

#[test]
fn sink_errors_propagate_unchanged() {
    let source = FixedSource(fixed_trail());

    let err = update_trip_stats(&source, &FailingSink, 7).unwrap_err();
    assert!(matches!(err, TriplogError::InvalidArgument(_)));
}

#[test]
fn empty_source_still_persists_zeroed_stats() {
    let source = FixedSource(Vec::new());
    let sink = RecordingSink(RefCell::new(Vec::new()));

    let stats = update_trip_stats(&source, &sink, 1).unwrap();

    assert_eq!(stats, TripStats::default());
    assert_eq!(sink.0.borrow().len(), 1);
}
