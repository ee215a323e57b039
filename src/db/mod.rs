// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! Services depend on the narrow store traits below rather than on a
//! storage medium. `FirestoreDb` backs production; `MemoryDb` backs tests
//! and local development.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{
    AthleteProfile, BestEffort, CalendarEvent, PlannedSession, TokenRecord, Workout,
};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const TOKENS: &str = "tokens";
    pub const WORKOUTS: &str = "workouts";
    pub const BEST_EFFORTS: &str = "best_efforts";
    pub const ATHLETE_PROFILES: &str = "athlete_profiles";
    pub const CALENDAR_EVENTS: &str = "calendar_events";
    pub const PLANNED_SESSIONS: &str = "planned_sessions";
}

/// OAuth token persistence, one whole record per (user, provider).
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get_tokens(&self, user_id: &str, provider: &str)
        -> Result<Option<TokenRecord>, AppError>;

    /// Replace the stored record (last writer wins).
    async fn put_tokens(&self, tokens: &TokenRecord) -> Result<(), AppError>;

    async fn delete_tokens(&self, user_id: &str, provider: &str) -> Result<(), AppError>;
}

/// Synced workouts and derived best efforts.
#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Insert or overwrite by natural key (user, provider, provider activity).
    async fn upsert_workout(&self, workout: &Workout) -> Result<(), AppError>;

    /// Workouts for a user, newest first.
    async fn list_workouts(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Workout>, AppError>;

    async fn upsert_best_effort(&self, effort: &BestEffort) -> Result<(), AppError>;

    async fn list_best_efforts(&self, user_id: &str) -> Result<Vec<BestEffort>, AppError>;
}

/// Profile, calendar and planned-session records.
#[async_trait]
pub trait AthleteStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<AthleteProfile>, AppError>;

    async fn upsert_profile(&self, profile: &AthleteProfile) -> Result<(), AppError>;

    /// Events for a user, ordered by start ascending.
    async fn list_events(&self, user_id: &str) -> Result<Vec<CalendarEvent>, AppError>;

    async fn create_event(&self, event: &CalendarEvent) -> Result<(), AppError>;

    /// Returns `false` if no such event belongs to the user.
    async fn delete_event(&self, user_id: &str, event_id: &str) -> Result<bool, AppError>;

    async fn put_session(&self, session: &PlannedSession) -> Result<(), AppError>;

    async fn get_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<PlannedSession>, AppError>;
}

/// Everything the HTTP layer needs from a datastore.
pub trait Database: TokenStore + WorkoutStore + AthleteStore {}

impl<T> Database for T where T: TokenStore + WorkoutStore + AthleteStore {}
