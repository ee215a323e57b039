// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout sync tests.
//!
//! These tests verify that:
//! 1. Re-running a sync never duplicates workouts
//! 2. A re-sync overwrites stale stored values
//! 3. One failing upsert does not abort the run
//! 4. Best efforts are derived from power series

use async_trait::async_trait;
use chrono::{Duration, Utc};
use mockito::ServerGuard;
use serde_json::json;
use smartcoach::db::{MemoryDb, TokenStore, WorkoutStore};
use smartcoach::error::AppError;
use smartcoach::models::{BestEffort, Workout};
use smartcoach::services::{SyncService, SyncSummary, WahooClient, WahooService};
use std::sync::Arc;

mod common;

const USER: &str = "user-1";

async fn connected_db() -> Arc<MemoryDb> {
    let db = Arc::new(MemoryDb::new());
    db.put_tokens(&common::token_record(
        USER,
        "access",
        "refresh",
        Utc::now() + Duration::hours(1),
    ))
    .await
    .unwrap();
    db
}

fn sync_service(
    server: &ServerGuard,
    db: Arc<MemoryDb>,
    store: Arc<dyn WorkoutStore>,
) -> SyncService {
    let config = common::test_config(&server.url());
    let wahoo = WahooService::new(WahooClient::new(&config), db);
    SyncService::new(wahoo, store)
}

async fn mock_workouts(server: &mut ServerGuard, body: serde_json::Value) -> mockito::Mock {
    server
        .mock("GET", "/v1/workouts")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body.to_string())
        .create_async()
        .await
}

fn two_rides(first_minutes: u32) -> serde_json::Value {
    json!({
        "workouts": [
            {
                "id": 10,
                "starts": "2024-05-01T06:00:00Z",
                "minutes": first_minutes,
                "workout_type_id": 0
            },
            {"id": 11, "starts": "2024-05-03T06:00:00Z", "minutes": 45, "workout_type_id": 4}
        ]
    })
}

#[tokio::test]
async fn test_sync_is_idempotent() {
    let mut server = mockito::Server::new_async().await;
    let _list = mock_workouts(&mut server, two_rides(60)).await;
    let db = connected_db().await;
    let sync = sync_service(&server, db.clone(), db.clone());

    let first = sync.sync_workouts(USER).await.unwrap();
    assert_eq!(first, SyncSummary { synced: 2, failed: 0 });
    let after_first = db.list_workouts(USER, None).await.unwrap();

    let second = sync.sync_workouts(USER).await.unwrap();
    assert_eq!(second, SyncSummary { synced: 2, failed: 0 });
    let after_second = db.list_workouts(USER, None).await.unwrap();

    assert_eq!(db.workout_count(), 2);
    assert_eq!(after_first, after_second);
    assert_eq!(after_second[0].provider_activity_id, "11");
    assert_eq!(after_second[0].sport, "trail_running");
}

#[tokio::test]
async fn test_resync_overwrites_stale_values() {
    let mut server = mockito::Server::new_async().await;
    let list = mock_workouts(&mut server, two_rides(60)).await;
    let db = connected_db().await;
    let sync = sync_service(&server, db.clone(), db.clone());

    sync.sync_workouts(USER).await.unwrap();

    // Wahoo corrected the duration of workout 10
    list.remove_async().await;
    let _list = mock_workouts(&mut server, two_rides(90)).await;
    sync.sync_workouts(USER).await.unwrap();

    let stored = db.list_workouts(USER, None).await.unwrap();
    assert_eq!(stored.len(), 2);
    let ride = stored
        .iter()
        .find(|w| w.provider_activity_id == "10")
        .unwrap();
    assert_eq!(ride.duration_seconds, 90 * 60);
}

/// Workout store that rejects one activity and delegates the rest.
struct FlakyStore {
    inner: Arc<MemoryDb>,
    failing_id: &'static str,
}

#[async_trait]
impl WorkoutStore for FlakyStore {
    async fn upsert_workout(&self, workout: &Workout) -> Result<(), AppError> {
        if workout.provider_activity_id == self.failing_id {
            return Err(AppError::Database("write rejected".to_string()));
        }
        self.inner.upsert_workout(workout).await
    }

    async fn list_workouts(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Workout>, AppError> {
        self.inner.list_workouts(user_id, limit).await
    }

    async fn upsert_best_effort(&self, effort: &BestEffort) -> Result<(), AppError> {
        self.inner.upsert_best_effort(effort).await
    }

    async fn list_best_efforts(&self, user_id: &str) -> Result<Vec<BestEffort>, AppError> {
        self.inner.list_best_efforts(user_id).await
    }
}

#[tokio::test]
async fn test_failed_upsert_is_counted_and_skipped() {
    let mut server = mockito::Server::new_async().await;
    let _list = mock_workouts(&mut server, two_rides(60)).await;
    let db = connected_db().await;
    let store = Arc::new(FlakyStore {
        inner: db.clone(),
        failing_id: "10",
    });
    let sync = sync_service(&server, db.clone(), store);

    let summary = sync.sync_workouts(USER).await.unwrap();

    assert_eq!(summary, SyncSummary { synced: 1, failed: 1 });
    let stored = db.list_workouts(USER, None).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].provider_activity_id, "11");
}

#[tokio::test]
async fn test_sync_stores_best_efforts() {
    let mut server = mockito::Server::new_async().await;
    let mut samples = vec![200; 120];
    samples[30..35].copy_from_slice(&[500, 500, 500, 500, 500]);
    let _list = mock_workouts(
        &mut server,
        json!([{
            "id": 77,
            "starts": "2024-05-01T06:00:00Z",
            "minutes": 2,
            "workout_type_id": 0,
            "power_samples": samples
        }]),
    )
    .await;
    let db = connected_db().await;
    let sync = sync_service(&server, db.clone(), db.clone());

    sync.sync_workouts(USER).await.unwrap();

    let efforts = db.list_best_efforts(USER).await.unwrap();
    let windows: Vec<&str> = efforts.iter().map(|e| e.window.as_str()).collect();
    assert_eq!(efforts.len(), 2, "only 5s and 1m fit in 120 samples: {windows:?}");

    let five_s = efforts.iter().find(|e| e.window == "5s").unwrap();
    assert_eq!(five_s.value, 500.0);
    assert_eq!(five_s.unit, "W");
    assert_eq!(five_s.sport, "cycling");

    let one_m = efforts.iter().find(|e| e.window == "1m").unwrap();
    assert_eq!(one_m.value, 225.0);
}

#[tokio::test]
async fn test_sync_without_connection() {
    let server = mockito::Server::new_async().await;
    let db = Arc::new(MemoryDb::new());
    let sync = sync_service(&server, db.clone(), db.clone());

    let err = sync.sync_workouts(USER).await.unwrap_err();

    assert!(matches!(err, AppError::NotConnected));
    assert_eq!(db.workout_count(), 0);
}

#[tokio::test]
async fn test_natural_keys_with_underscores_stay_separate() {
    let db = MemoryDb::new();
    db.upsert_workout(&common::workout("a_wahoo_b", "c", "cycling", 3600, "2024-01-01"))
        .await
        .unwrap();
    db.upsert_workout(&common::workout("a", "b_wahoo_c", "running", 1800, "2024-01-02"))
        .await
        .unwrap();

    assert_eq!(db.workout_count(), 2);
    let first = db.list_workouts("a_wahoo_b", None).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].provider_activity_id, "c");
    let second = db.list_workouts("a", None).await.unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].provider_activity_id, "b_wahoo_c");
}
