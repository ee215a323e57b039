// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: profile, calendar, stored workouts
//! and analytics.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    AthleteProfile, BestEffort, CalendarEvent, NewCalendarEvent, ProfileUpdate, WeeklyLoadBucket,
    Workout, WorkoutFilter,
};
use crate::services::analytics;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", get(get_profile).post(upsert_profile))
        .route("/api/calendar/events", get(list_events).post(create_event))
        .route("/api/calendar/events/{id}", delete(delete_event))
        .route("/api/workouts", get(list_workouts))
        .route("/api/analytics/weekly-load", get(weekly_load))
        .route("/api/analytics/best-efforts", get(best_efforts))
}

/// Generic status acknowledgement.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

// ─── Athlete Profile ─────────────────────────────────────────

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<AthleteProfile>> {
    let profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Athlete profile".to_string()))?;

    Ok(Json(profile))
}

/// Create or partially update the profile. Absent fields keep stored values.
async fn upsert_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<AthleteProfile>> {
    let mut profile = state
        .db
        .get_profile(&user.user_id)
        .await?
        .unwrap_or_else(|| AthleteProfile {
            user_id: user.user_id.clone(),
            ..Default::default()
        });

    profile.apply(update, &format_utc_rfc3339(chrono::Utc::now()));
    state.db.upsert_profile(&profile).await?;

    tracing::info!(user_id = %user.user_id, "Athlete profile updated");
    Ok(Json(profile))
}

// ─── Calendar ────────────────────────────────────────────────

async fn list_events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<CalendarEvent>>> {
    Ok(Json(state.db.list_events(&user.user_id).await?))
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewCalendarEvent>,
) -> Result<(StatusCode, Json<CalendarEvent>)> {
    body.validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if let Some(end) = body.end_dt {
        if end < body.start_dt {
            return Err(AppError::BadRequest(
                "end_dt must not be before start_dt".to_string(),
            ));
        }
    }

    let event = body.into_event(uuid::Uuid::new_v4().to_string(), &user.user_id);
    state.db.create_event(&event).await?;

    Ok((StatusCode::CREATED, Json(event)))
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>> {
    if !state.db.delete_event(&user.user_id, &id).await? {
        return Err(AppError::NotFound(format!("Calendar event {}", id)));
    }

    Ok(Json(StatusResponse { status: "deleted" }))
}

// ─── Workouts & Analytics ────────────────────────────────────

/// Stored workouts, newest first.
async fn list_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(filter): Query<WorkoutFilter>,
) -> Result<Json<Vec<Workout>>> {
    let workouts = state.db.list_workouts(&user.user_id, None).await?;
    Ok(Json(filter.apply(workouts)))
}

async fn weekly_load(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<WeeklyLoadBucket>>> {
    let workouts = state.db.list_workouts(&user.user_id, None).await?;
    Ok(Json(analytics::weekly_load(&workouts)))
}

async fn best_efforts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<BestEffort>>> {
    Ok(Json(state.db.list_best_efforts(&user.user_id).await?))
}
