// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training-load aggregation and best-effort detection.

use crate::models::{BestEffort, TrendTag, WeeklyLoadBucket, Workout};
use crate::time_utils::{iso_week_label, parse_start_date};
use std::collections::BTreeMap;

/// Week-over-week change (minutes) that must be exceeded to count as a trend.
pub const TREND_THRESHOLD_MINUTES: f64 = 100.0;

/// Best-effort windows as (label, length in seconds).
pub const BEST_EFFORT_WINDOWS: [(&str, usize); 5] = [
    ("5s", 5),
    ("1m", 60),
    ("5m", 5 * 60),
    ("20m", 20 * 60),
    ("60m", 60 * 60),
];

/// Bucket workouts by ISO week and tag each week against the previous bucket.
///
/// Weeks without workouts get no bucket, so "previous" means the previous
/// bucket in sorted order, which may be more than one calendar week earlier.
pub fn weekly_load(workouts: &[Workout]) -> Vec<WeeklyLoadBucket> {
    // Labels are zero-padded, so lexical order is chronological.
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();

    for workout in workouts {
        let Some(date) = parse_start_date(&workout.start_time) else {
            tracing::debug!(
                workout = %workout.provider_activity_id,
                start_time = %workout.start_time,
                "Skipping workout with unparseable start time"
            );
            continue;
        };
        *totals.entry(iso_week_label(date)).or_insert(0.0) += workout.duration_minutes();
    }

    let mut previous: Option<f64> = None;
    totals
        .into_iter()
        .map(|(week_label, total_minutes)| {
            let trend_tag = trend_tag(previous, total_minutes);
            previous = Some(total_minutes);
            WeeklyLoadBucket {
                week_label,
                total_minutes,
                trend_tag,
            }
        })
        .collect()
}

fn trend_tag(previous: Option<f64>, current: f64) -> TrendTag {
    let Some(previous) = previous else {
        return TrendTag::Baseline;
    };

    let delta = current - previous;
    if delta > TREND_THRESHOLD_MINUTES {
        TrendTag::Increase
    } else if delta < -TREND_THRESHOLD_MINUTES {
        TrendTag::Decrease
    } else {
        TrendTag::Stable
    }
}

/// Highest mean over any contiguous `window` samples, or `None` if the series
/// is shorter than the window.
pub fn peak_power(samples: &[f64], window: usize) -> Option<f64> {
    if window == 0 || samples.len() < window {
        return None;
    }

    let mut prefix = Vec::with_capacity(samples.len() + 1);
    prefix.push(0.0);
    for sample in samples {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + sample);
    }

    (0..=samples.len() - window)
        .map(|start| (prefix[start + window] - prefix[start]) / window as f64)
        .fold(None, |best: Option<f64>, mean| {
            Some(best.map_or(mean, |b| b.max(mean)))
        })
}

/// 1 Hz power series carried in the raw provider record, if any.
///
/// Dropouts (null or non-numeric samples) count as zero watts so the series
/// keeps its timing.
pub fn power_samples(workout: &Workout) -> Option<Vec<f64>> {
    let samples: Vec<f64> = workout
        .raw_metrics
        .get("power_samples")?
        .as_array()?
        .iter()
        .map(|v| v.as_f64().unwrap_or(0.0))
        .collect();

    (!samples.is_empty()).then_some(samples)
}

/// Peak power efforts for every window the workout's power series covers.
pub fn best_efforts(workout: &Workout) -> Vec<BestEffort> {
    let Some(samples) = power_samples(workout) else {
        return Vec::new();
    };

    let workout_id = workout.document_id();
    BEST_EFFORT_WINDOWS
        .iter()
        .filter_map(|(label, seconds)| {
            peak_power(&samples, *seconds).map(|value| BestEffort {
                user_id: workout.user_id.clone(),
                workout_id: workout_id.clone(),
                sport: workout.sport.clone(),
                window: label.to_string(),
                value: (value * 10.0).round() / 10.0,
                unit: "W".to_string(),
                recorded_at: workout.start_time.clone(),
            })
        })
        .collect()
}
