// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout synchronization from Wahoo into the datastore.

use crate::db::WorkoutStore;
use crate::error::AppError;
use crate::models::WorkoutFilter;
use crate::services::analytics;
use crate::services::wahoo::WahooService;
use serde::Serialize;
use std::sync::Arc;

/// Result of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Workouts written
    pub synced: usize,
    /// Workouts whose upsert failed; re-running the sync retries them
    pub failed: usize,
}

/// Pulls the full workout list and upserts it by natural key.
#[derive(Clone)]
pub struct SyncService {
    wahoo: WahooService,
    workouts: Arc<dyn WorkoutStore>,
}

impl SyncService {
    pub fn new(wahoo: WahooService, workouts: Arc<dyn WorkoutStore>) -> Self {
        Self { wahoo, workouts }
    }

    /// Sync every remote workout for the user.
    ///
    /// Fetch errors abort the run. A failed upsert only counts against
    /// `failed`; the remaining records are still written.
    pub async fn sync_workouts(&self, user_id: &str) -> Result<SyncSummary, AppError> {
        let remote = self
            .wahoo
            .fetch_workouts(user_id, &WorkoutFilter::default())
            .await?;

        let mut summary = SyncSummary {
            synced: 0,
            failed: 0,
        };

        for workout in &remote {
            if let Err(e) = self.workouts.upsert_workout(workout).await {
                tracing::warn!(
                    user_id,
                    workout = %workout.provider_activity_id,
                    error = %e,
                    "Failed to upsert workout"
                );
                summary.failed += 1;
                continue;
            }
            summary.synced += 1;

            for effort in analytics::best_efforts(workout) {
                if let Err(e) = self.workouts.upsert_best_effort(&effort).await {
                    tracing::warn!(
                        user_id,
                        workout = %workout.provider_activity_id,
                        window = %effort.window,
                        error = %e,
                        "Failed to store best effort"
                    );
                }
            }
        }

        tracing::info!(
            user_id,
            synced = summary.synced,
            failed = summary.failed,
            "Workout sync complete"
        );

        Ok(summary)
    }
}
