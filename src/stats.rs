//! Movement and speed statistics over an ordered position trail.
//!
//! A single forward pass attributes the elapsed seconds between consecutive
//! samples to movement or stopped time, then the speed and time summaries are
//! finished with their percentage fields. Pure in-memory reduction; reading
//! the samples and persisting the result belong to the action layer.

use crate::models::{PositionSample, SpeedStats, TimeStats, TripStats};

/// Reduce an ordered position trail to a [`TripStats`] summary.
///
/// `samples` must be ordered ascending by `date_utc_at`; the position query
/// layer guarantees this. Elapsed seconds are taken as-is from consecutive
/// timestamp differences, so misordered input silently skews the time split.
///
/// An empty trail yields all-zero stats, not an error. The first sample has
/// no predecessor and contributes zero elapsed seconds.
pub fn aggregate(samples: &[PositionSample]) -> TripStats {
    debug_assert!(
        samples
            .windows(2)
            .all(|w| w[0].date_utc_at <= w[1].date_utc_at),
        "position samples must be ordered ascending by date_utc_at"
    );

    let mut stats = TripStats::default();

    let mut previous: Option<&PositionSample> = None;
    for position in samples {
        let seconds = match previous {
            Some(prev) => (position.date_utc_at - prev.date_utc_at).num_seconds(),
            None => 0,
        };

        // Any nonzero speed counts as movement; there is no threshold.
        if position.speed != 0.0 {
            stats.time.movement += seconds;
        } else {
            stats.time.stopped += seconds;
        }

        previous = Some(position);
    }

    finish_speed(&mut stats.speed, samples);
    finish_time(&mut stats.time);

    stats
}

/// Fill the speed summary: max/min/avg rounded to 2 decimals, then the
/// percentage fields relative to max.
///
/// When max is zero (all-stopped trail or no samples at all) the percentage
/// fields keep their zero defaults instead of dividing by zero.
fn finish_speed(speed: &mut SpeedStats, samples: &[PositionSample]) {
    let mut max = 0.0f64;
    let mut min = 0.0f64;
    let mut sum = 0.0f64;

    for (i, position) in samples.iter().enumerate() {
        if i == 0 {
            max = position.speed;
            min = position.speed;
        } else {
            max = max.max(position.speed);
            min = min.min(position.speed);
        }
        sum += position.speed;
    }

    let avg = if samples.is_empty() {
        0.0
    } else {
        sum / samples.len() as f64
    };

    speed.max = round2(max);
    speed.min = round2(min);
    speed.avg = round2(avg);

    if speed.max == 0.0 {
        return;
    }

    // Percentages come from the already-rounded values, so avg 3.33 of
    // max 10 reads as 33, not 33.3-rounded-from-raw.
    speed.max_percent = 100;
    speed.min_percent = (speed.min * 100.0 / speed.max).round() as i64;
    speed.avg_percent = (speed.avg * 100.0 / speed.max).round() as i64;
}

/// Fill the time summary: total plus the percentage split.
///
/// When total is zero (empty or single-sample trail, or negative durations
/// cancelling out) the percentage fields keep their zero defaults.
fn finish_time(time: &mut TimeStats) {
    let total = time.movement + time.stopped;
    if total == 0 {
        return;
    }

    time.total = total;
    time.total_percent = 100;
    time.movement_percent = (time.movement as f64 * 100.0 / total as f64).round() as i64;
    time.stopped_percent = (time.stopped as f64 * 100.0 / total as f64).round() as i64;
}

/// Round half away from zero to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
