// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coaching assistant: athlete context assembly plus chat completions.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{CalendarEvent, PlannedSession, Workout};
use crate::services::llm::{ChatClient, ChatMessage};
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Number of most recent workouts included in the context.
pub const RECENT_WORKOUT_LIMIT: u32 = 10;

const PLAN_SYSTEM_PROMPT: &str = "You are a professional endurance coach for cycling and \
trail running. Always answer with a single JSON object.";

const CHAT_SYSTEM_PROMPT: &str = "You are a professional endurance coach for cycling and \
trail running. Use the athlete context supplied with each message to give specific, \
practical advice.";

/// What the coach knows about the athlete.
#[derive(Debug, Clone, Serialize)]
pub struct AthleteContext {
    /// Stored profile, or `{}` when the athlete has none
    pub profile: Value,
    /// Newest first, without the raw provider payload
    pub recent_workouts: Vec<Workout>,
    /// Events starting now or later, soonest first
    pub upcoming_events: Vec<CalendarEvent>,
}

/// A generated plan and the sessions persisted from it.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedPlan {
    pub plan: Value,
    pub sessions: Vec<PlannedSession>,
}

#[derive(Clone)]
pub struct CoachService {
    llm: ChatClient,
    db: Arc<dyn Database>,
}

impl CoachService {
    pub fn new(llm: ChatClient, db: Arc<dyn Database>) -> Self {
        Self { llm, db }
    }

    pub async fn athlete_context(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AthleteContext, AppError> {
        let profile = match self.db.get_profile(user_id).await? {
            Some(profile) => serde_json::to_value(profile)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Profile encode failed: {}", e)))?,
            None => Value::Object(Default::default()),
        };

        let recent_workouts = self
            .db
            .list_workouts(user_id, Some(RECENT_WORKOUT_LIMIT))
            .await?
            .into_iter()
            .map(|mut workout| {
                workout.raw_metrics = Value::Null;
                workout
            })
            .collect();

        let upcoming_events = self
            .db
            .list_events(user_id)
            .await?
            .into_iter()
            .filter(|event| event.start_dt >= now)
            .collect();

        Ok(AthleteContext {
            profile,
            recent_workouts,
            upcoming_events,
        })
    }

    /// Generate a 7-day plan and store its sessions.
    pub async fn generate_weekly_plan(&self, user_id: &str) -> Result<GeneratedPlan, AppError> {
        let now = Utc::now();
        let context = self.athlete_context(user_id, now).await?;

        let messages = [
            ChatMessage::system(PLAN_SYSTEM_PROMPT),
            ChatMessage::user(plan_prompt(&context)?),
        ];

        let reply = self.llm.complete(&messages, true).await?;
        let plan: Value = serde_json::from_str(&reply)
            .map_err(|e| AppError::Llm(format!("Plan is not valid JSON: {}", e)))?;

        let created_at = format_utc_rfc3339(now);
        let sessions = sessions_from_plan(&plan, user_id, &created_at);
        for session in &sessions {
            self.db.put_session(session).await?;
        }

        tracing::info!(user_id, sessions = sessions.len(), "Weekly plan generated");
        Ok(GeneratedPlan { plan, sessions })
    }

    /// Conversational reply grounded in the athlete context.
    pub async fn chat(
        &self,
        user_id: &str,
        message: &str,
        history: Vec<ChatMessage>,
    ) -> Result<String, AppError> {
        let context = self.athlete_context(user_id, Utc::now()).await?;
        let context_json = to_json(&context)?;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(CHAT_SYSTEM_PROMPT));
        messages.extend(history);
        messages.push(ChatMessage::user(format!(
            "Context: {}\n\nAthlete: {}",
            context_json, message
        )));

        self.llm.complete(&messages, false).await
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Context encode failed: {}", e)))
}

fn plan_prompt(context: &AthleteContext) -> Result<String, AppError> {
    Ok(format!(
        "Build a 7-day training plan for this athlete.\n\n\
         Athlete profile: {}\n\
         Recent workouts: {}\n\
         Upcoming events: {}\n\n\
         Respect the athlete's zones and FTP, adjust load to the recent workouts, and \
         taper or sharpen for any race in the coming weeks.\n\
         Reply with a JSON object: {{\"summary\": string, \"sessions\": [{{\"title\": string, \
         \"sport\": string, \"scheduled_date\": string, \"structure\": {{\"warmup\": ..., \
         \"intervals\": ..., \"cooldown\": ...}}, \"targets\": object, \"why\": string}}]}}",
        to_json(&context.profile)?,
        to_json(&context.recent_workouts)?,
        to_json(&context.upcoming_events)?,
    ))
}

fn string_field(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Turn the plan's `sessions` array into stored sessions. Non-object entries
/// are ignored.
pub fn sessions_from_plan(plan: &Value, user_id: &str, created_at: &str) -> Vec<PlannedSession> {
    let Some(entries) = plan.get("sessions").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| entry.is_object())
        .enumerate()
        .map(|(index, entry)| PlannedSession {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            title: string_field(entry, &["title", "name"])
                .unwrap_or_else(|| format!("Session {}", index + 1)),
            sport: string_field(entry, &["sport"]).unwrap_or_else(|| "other".to_string()),
            scheduled_date: string_field(entry, &["scheduled_date", "date", "day"]),
            structure_json: entry
                .get("structure")
                .or_else(|| entry.get("structure_json"))
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default())),
            targets: entry.get("targets").cloned(),
            why: string_field(entry, &["why"]),
            created_at: created_at.to_string(),
        })
        .collect()
}
