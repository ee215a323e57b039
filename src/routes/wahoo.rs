// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wahoo connection and sync routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Workout, WorkoutFilter};
use crate::routes::api::StatusResponse;
use crate::services::SyncSummary;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/wahoo/disconnect", post(disconnect))
        .route("/api/wahoo/workouts", get(remote_workouts))
        .route("/api/sync", post(sync))
}

async fn disconnect(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatusResponse>> {
    state.wahoo.disconnect(&user.user_id).await?;
    Ok(Json(StatusResponse {
        status: "disconnected",
    }))
}

/// Workouts straight from Wahoo, filtered but not stored.
async fn remote_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<WorkoutFilter>,
) -> Result<Json<Vec<Workout>>> {
    Ok(Json(
        state.wahoo.fetch_workouts(&user.user_id, &filter).await?,
    ))
}

async fn sync(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SyncSummary>> {
    tracing::info!(user_id = %user.user_id, "Manual sync requested");
    Ok(Json(state.sync.sync_workouts(&user.user_id).await?))
}
