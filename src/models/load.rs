// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Derived training-load and best-effort records.

use serde::{Deserialize, Serialize};

/// Week-over-week load trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendTag {
    /// First week in the sequence, nothing to compare against
    Baseline,
    Increase,
    Decrease,
    Stable,
}

/// Total training time for one ISO week. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyLoadBucket {
    /// `{ISO year}-W{ISO week:02}`
    pub week_label: String,
    pub total_minutes: f64,
    pub trend_tag: TrendTag,
}

/// Peak mean power over a fixed window within one workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestEffort {
    pub user_id: String,
    /// Document ID of the source workout
    pub workout_id: String,
    pub sport: String,
    /// Window label ("5s", "1m", "5m", "20m", "60m")
    pub window: String,
    pub value: f64,
    pub unit: String,
    pub recorded_at: String,
}

impl BestEffort {
    pub fn document_id(&self) -> String {
        super::document_key(&[
            self.user_id.as_str(),
            self.workout_id.as_str(),
            self.window.as_str(),
        ])
    }
}
