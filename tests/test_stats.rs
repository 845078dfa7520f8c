//! Unit tests for the movement/speed stats reducer.

use chrono::{DateTime, Duration, TimeZone, Utc};
use triplog_sdk::models::PositionSample;
use triplog_sdk::stats::aggregate;

/// Build an ordered trail from `(speed, seconds_after_start)` pairs.
fn trail(points: &[(f64, i64)]) -> Vec<PositionSample> {
    let start: DateTime<Utc> = Utc.with_ymd_and_hms(2024, 5, 4, 10, 0, 0).unwrap();
    points
        .iter()
        .map(|&(speed, offset)| PositionSample {
            speed,
            date_utc_at: start + Duration::seconds(offset),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn mixed_moving_and_stopped_trail() {
    let stats = aggregate(&trail(&[(0.0, 0), (10.0, 60), (0.0, 120)]));

    assert_eq!(stats.time.movement, 60);
    assert_eq!(stats.time.stopped, 60);
    assert_eq!(stats.time.total, 120);
    assert_eq!(stats.time.total_percent, 100);
    assert_eq!(stats.time.movement_percent, 50);
    assert_eq!(stats.time.stopped_percent, 50);

    assert_eq!(stats.speed.max, 10.0);
    assert_eq!(stats.speed.min, 0.0);
    assert_eq!(stats.speed.avg, 3.33);
    assert_eq!(stats.speed.max_percent, 100);
    assert_eq!(stats.speed.min_percent, 0);
    assert_eq!(stats.speed.avg_percent, 33);
}

#[test]
fn empty_trail_yields_all_zero_stats() {
    let stats = aggregate(&[]);

    assert_eq!(stats, Default::default());
}

#[test]
fn single_sample_has_no_elapsed_time() {
    let stats = aggregate(&trail(&[(50.0, 0)]));

    assert_eq!(stats.time.total, 0);
    assert_eq!(stats.time.movement, 0);
    assert_eq!(stats.time.stopped, 0);
    assert_eq!(stats.time.total_percent, 0);
    assert_eq!(stats.time.movement_percent, 0);
    assert_eq!(stats.time.stopped_percent, 0);

    assert_eq!(stats.speed.max, 50.0);
    assert_eq!(stats.speed.min, 50.0);
    assert_eq!(stats.speed.avg, 50.0);
    assert_eq!(stats.speed.max_percent, 100);
    assert_eq!(stats.speed.min_percent, 100);
    assert_eq!(stats.speed.avg_percent, 100);
}

#[test]
fn single_stopped_sample_leaves_speed_percents_at_zero() {
    let stats = aggregate(&trail(&[(0.0, 0)]));

    assert_eq!(stats, Default::default());
}

#[test]
fn constant_speed_trail_has_all_percentages_at_100() {
    let stats = aggregate(&trail(&[(40.0, 0), (40.0, 30), (40.0, 60), (40.0, 90)]));

    assert_eq!(stats.speed.max, 40.0);
    assert_eq!(stats.speed.min, 40.0);
    assert_eq!(stats.speed.avg, 40.0);
    assert_eq!(stats.speed.max_percent, 100);
    assert_eq!(stats.speed.min_percent, 100);
    assert_eq!(stats.speed.avg_percent, 100);

    assert_eq!(stats.time.movement, 90);
    assert_eq!(stats.time.stopped, 0);
    assert_eq!(stats.time.total, 90);
    assert_eq!(stats.time.movement_percent, 100);
    assert_eq!(stats.time.stopped_percent, 0);
}

// ---------------------------------------------------------------------------
// Zero-denominator policies
// ---------------------------------------------------------------------------

#[test]
fn all_stopped_trail_keeps_speed_percents_untouched() {
    let stats = aggregate(&trail(&[(0.0, 0), (0.0, 60), (0.0, 120)]));

    assert_eq!(stats.speed.max, 0.0);
    assert_eq!(stats.speed.min, 0.0);
    assert_eq!(stats.speed.avg, 0.0);
    assert_eq!(stats.speed.max_percent, 0);
    assert_eq!(stats.speed.min_percent, 0);
    assert_eq!(stats.speed.avg_percent, 0);

    // Time is still attributed
    assert_eq!(stats.time.stopped, 120);
    assert_eq!(stats.time.movement, 0);
    assert_eq!(stats.time.total, 120);
    assert_eq!(stats.time.stopped_percent, 100);
}

#[test]
fn zero_total_time_keeps_time_percents_untouched() {
    // Two samples at the same instant: elapsed is zero everywhere
    let stats = aggregate(&trail(&[(10.0, 0), (20.0, 0)]));

    assert_eq!(stats.time.total, 0);
    assert_eq!(stats.time.total_percent, 0);
    assert_eq!(stats.time.movement_percent, 0);
    assert_eq!(stats.time.stopped_percent, 0);

    // Speed side is unaffected
    assert_eq!(stats.speed.max, 20.0);
    assert_eq!(stats.speed.max_percent, 100);
}

// ---------------------------------------------------------------------------
// Arithmetic details
// ---------------------------------------------------------------------------

#[test]
fn averages_round_to_two_decimals() {
    // avg = 2/3 = 0.666... -> 0.67
    let stats = aggregate(&trail(&[(1.0, 0), (1.0, 30), (0.0, 60)]));
    assert_eq!(stats.speed.avg, 0.67);
    // percents come from the rounded values: 0.67 * 100 / 1.0 = 67
    assert_eq!(stats.speed.avg_percent, 67);
}

#[test]
fn percent_rounding_is_half_away_from_zero() {
    // min 1, max 8: 1 * 100 / 8 = 12.5 -> 13
    let stats = aggregate(&trail(&[(1.0, 0), (8.0, 60)]));
    assert_eq!(stats.speed.min_percent, 13);
}

#[test]
fn movement_attribution_uses_current_sample_speed() {
    // The interval before a moving sample counts as movement even when the
    // previous sample was stopped, and vice versa.
    let stats = aggregate(&trail(&[(0.0, 0), (30.0, 45), (0.0, 105)]));
    assert_eq!(stats.time.movement, 45);
    assert_eq!(stats.time.stopped, 60);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn min_avg_max_are_ordered() {
    let trails = [
        trail(&[(3.0, 0), (12.0, 30), (7.5, 60), (0.0, 90)]),
        trail(&[(80.0, 0), (80.1, 30)]),
        trail(&[(0.01, 0), (110.0, 30), (55.0, 60)]),
    ];

    for samples in &trails {
        let stats = aggregate(samples);
        assert!(stats.speed.min <= stats.speed.avg + 0.01);
        assert!(stats.speed.avg <= stats.speed.max + 0.01);
    }
}

#[test]
fn time_split_sums_to_total_and_percents_drift_at_most_one() {
    let samples = trail(&[(0.0, 0), (25.0, 40), (0.0, 65), (60.0, 125), (60.0, 185)]);
    let stats = aggregate(&samples);

    assert_eq!(stats.time.movement + stats.time.stopped, stats.time.total);
    let percent_sum = stats.time.movement_percent + stats.time.stopped_percent;
    assert!((percent_sum - 100).abs() <= 1, "percent sum was {}", percent_sum);
}

#[test]
fn aggregation_is_idempotent() {
    let samples = trail(&[(0.0, 0), (10.0, 60), (0.0, 120), (33.3, 180)]);

    let first = aggregate(&samples);
    let second = aggregate(&samples);

    assert_eq!(first, second);
}
