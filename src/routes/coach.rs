// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coach and planned-session routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::PlannedSession;
use crate::services::{ChatMessage, GeneratedPlan};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/coach/generate-plan", post(generate_plan))
        .route("/api/coach/chat", post(chat))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/export", get(export_session))
}

// ─── Coach ───────────────────────────────────────────────────

async fn generate_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<GeneratedPlan>> {
    Ok(Json(state.coach.generate_weekly_plan(&user.user_id).await?))
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<HistoryMessage>,
}

/// Earlier turn supplied by the client. System turns are not accepted.
#[derive(Deserialize)]
struct HistoryMessage {
    role: HistoryRole,
    content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum HistoryRole {
    User,
    Assistant,
}

impl From<HistoryMessage> for ChatMessage {
    fn from(message: HistoryMessage) -> Self {
        match message.role {
            HistoryRole::User => ChatMessage::user(message.content),
            HistoryRole::Assistant => ChatMessage::assistant(message.content),
        }
    }
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let response = state
        .coach
        .chat(
            &user.user_id,
            &request.message,
            request.history.into_iter().map(ChatMessage::from).collect(),
        )
        .await?;

    Ok(Json(ChatResponse { response }))
}

// ─── Planned Sessions ────────────────────────────────────────

async fn load_session(state: &AppState, user_id: &str, id: &str) -> Result<PlannedSession> {
    state
        .db
        .get_session(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {}", id)))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<PlannedSession>> {
    Ok(Json(load_session(&state, &user.user_id, &id).await?))
}

#[derive(Deserialize)]
struct ExportQuery {
    #[serde(default = "default_format")]
    format: String,
}

fn default_format() -> String {
    "json".to_string()
}

/// Export the session structure for a head unit.
async fn export_session(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<serde_json::Value>> {
    let session = load_session(&state, &user.user_id, &id).await?;

    if query.format != "json" {
        return Err(AppError::BadRequest(
            "Format not supported yet. Use 'json'.".to_string(),
        ));
    }

    Ok(Json(session.structure_json))
}
