// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout model for storage and API.

use serde::{Deserialize, Serialize};

/// Stored workout, one per (user, provider, provider activity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    /// Owner
    pub user_id: String,
    /// Source provider ("wahoo")
    pub provider: String,
    /// Activity ID assigned by the provider
    pub provider_activity_id: String,
    /// Sport ("cycling", "running", ...)
    pub sport: String,
    /// Start date/time (ISO 8601)
    pub start_time: String,
    pub duration_seconds: i64,
    /// Distance in meters
    pub distance_m: Option<f64>,
    /// Elevation gain in meters
    pub elevation_m: Option<f64>,
    pub avg_heart_rate: Option<f64>,
    /// Average power in watts
    pub avg_power: Option<f64>,
    /// Untouched provider record
    #[serde(default)]
    pub raw_metrics: serde_json::Value,
}

impl Workout {
    /// Document key derived from the natural key, so re-syncs overwrite.
    pub fn document_id(&self) -> String {
        workout_document_id(&self.user_id, &self.provider, &self.provider_activity_id)
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_seconds as f64 / 60.0
    }
}

pub fn workout_document_id(user_id: &str, provider: &str, provider_activity_id: &str) -> String {
    super::document_key(&[user_id, provider, provider_activity_id])
}

/// Client-side workout filters. All present filters must match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkoutFilter {
    /// Exact sport match
    pub activity_type: Option<String>,
    /// Inclusive lower bound on `start_time` (ISO 8601, compared lexically)
    pub min_date: Option<String>,
    /// Inclusive lower bound on duration, in minutes
    pub min_duration: Option<u32>,
}

impl WorkoutFilter {
    pub fn matches(&self, workout: &Workout) -> bool {
        if let Some(activity_type) = &self.activity_type {
            if workout.sport != *activity_type {
                return false;
            }
        }

        if let Some(min_date) = &self.min_date {
            if workout.start_time.as_str() < min_date.as_str() {
                return false;
            }
        }

        if let Some(min_duration) = self.min_duration {
            if workout.duration_seconds < i64::from(min_duration) * 60 {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, workouts: Vec<Workout>) -> Vec<Workout> {
        workouts.into_iter().filter(|w| self.matches(w)).collect()
    }
}
