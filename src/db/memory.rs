// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process datastore on concurrent hash maps.

use super::{AthleteStore, TokenStore, WorkoutStore};
use crate::error::AppError;
use crate::models::token::token_document_id;
use crate::models::{
    AthleteProfile, BestEffort, CalendarEvent, PlannedSession, TokenRecord, Workout,
};
use async_trait::async_trait;
use dashmap::DashMap;

/// Datastore kept entirely in memory. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryDb {
    tokens: DashMap<String, TokenRecord>,
    workouts: DashMap<String, Workout>,
    best_efforts: DashMap<String, BestEffort>,
    profiles: DashMap<String, AthleteProfile>,
    events: DashMap<String, CalendarEvent>,
    sessions: DashMap<String, PlannedSession>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored workouts across all users.
    pub fn workout_count(&self) -> usize {
        self.workouts.len()
    }
}

#[async_trait]
impl TokenStore for MemoryDb {
    async fn get_tokens(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<TokenRecord>, AppError> {
        Ok(self
            .tokens
            .get(&token_document_id(user_id, provider))
            .map(|entry| entry.value().clone()))
    }

    async fn put_tokens(&self, tokens: &TokenRecord) -> Result<(), AppError> {
        self.tokens.insert(tokens.document_id(), tokens.clone());
        Ok(())
    }

    async fn delete_tokens(&self, user_id: &str, provider: &str) -> Result<(), AppError> {
        self.tokens.remove(&token_document_id(user_id, provider));
        Ok(())
    }
}

#[async_trait]
impl WorkoutStore for MemoryDb {
    async fn upsert_workout(&self, workout: &Workout) -> Result<(), AppError> {
        self.workouts.insert(workout.document_id(), workout.clone());
        Ok(())
    }

    async fn list_workouts(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Workout>, AppError> {
        let mut workouts: Vec<Workout> = self
            .workouts
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();

        workouts.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| a.provider_activity_id.cmp(&b.provider_activity_id))
        });

        if let Some(limit) = limit {
            workouts.truncate(limit as usize);
        }
        Ok(workouts)
    }

    async fn upsert_best_effort(&self, effort: &BestEffort) -> Result<(), AppError> {
        self.best_efforts
            .insert(effort.document_id(), effort.clone());
        Ok(())
    }

    async fn list_best_efforts(&self, user_id: &str) -> Result<Vec<BestEffort>, AppError> {
        let mut efforts: Vec<BestEffort> = self
            .best_efforts
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        efforts.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(efforts)
    }
}

#[async_trait]
impl AthleteStore for MemoryDb {
    async fn get_profile(&self, user_id: &str) -> Result<Option<AthleteProfile>, AppError> {
        Ok(self.profiles.get(user_id).map(|entry| entry.value().clone()))
    }

    async fn upsert_profile(&self, profile: &AthleteProfile) -> Result<(), AppError> {
        self.profiles
            .insert(profile.user_id.clone(), profile.clone());
        Ok(())
    }

    async fn list_events(&self, user_id: &str) -> Result<Vec<CalendarEvent>, AppError> {
        let mut events: Vec<CalendarEvent> = self
            .events
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        events.sort_by(|a, b| a.start_dt.cmp(&b.start_dt));
        Ok(events)
    }

    async fn create_event(&self, event: &CalendarEvent) -> Result<(), AppError> {
        self.events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn delete_event(&self, user_id: &str, event_id: &str) -> Result<bool, AppError> {
        Ok(self
            .events
            .remove_if(event_id, |_, event| event.user_id == user_id)
            .is_some())
    }

    async fn put_session(&self, session: &PlannedSession) -> Result<(), AppError> {
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<PlannedSession>, AppError> {
        Ok(self
            .sessions
            .get(session_id)
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone()))
    }
}
