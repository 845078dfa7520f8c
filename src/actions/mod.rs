//! Action modules: one struct per unit of business logic over the telemetry
//! tables. Actions read through the query layer, derive data, and write the
//! result back through the trip writers.

pub mod update_stats;

pub use update_stats::{update_trip_stats, SampleSource, StatsSink, UpdateStats};
