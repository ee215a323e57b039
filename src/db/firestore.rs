// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides the store traits on top of Firestore collections:
//! - Tokens (OAuth tokens per user and provider)
//! - Workouts and best efforts (synced from Wahoo)
//! - Athlete profiles, calendar events and planned sessions

use super::{AthleteStore, TokenStore, WorkoutStore};
use crate::db::collections;
use crate::error::AppError;
use crate::models::token::token_document_id;
use crate::models::{
    AthleteProfile, BestEffort, CalendarEvent, PlannedSession, TokenRecord, Workout,
};
use async_trait::async_trait;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. Every operation returns a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn put<T>(&self, collection: &str, document_id: &str, object: &T) -> Result<(), AppError>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Send + Sync,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(document_id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get<T>(&self, collection: &str, document_id: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(document_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete(&self, collection: &str, document_id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(document_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FirestoreDb {
    async fn get_tokens(
        &self,
        user_id: &str,
        provider: &str,
    ) -> Result<Option<TokenRecord>, AppError> {
        self.get(collections::TOKENS, &token_document_id(user_id, provider))
            .await
    }

    async fn put_tokens(&self, tokens: &TokenRecord) -> Result<(), AppError> {
        self.put(collections::TOKENS, &tokens.document_id(), tokens)
            .await
    }

    async fn delete_tokens(&self, user_id: &str, provider: &str) -> Result<(), AppError> {
        self.delete(collections::TOKENS, &token_document_id(user_id, provider))
            .await
    }
}

#[async_trait]
impl WorkoutStore for FirestoreDb {
    async fn upsert_workout(&self, workout: &Workout) -> Result<(), AppError> {
        self.put(collections::WORKOUTS, &workout.document_id(), workout)
            .await
    }

    async fn list_workouts(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<Workout>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([("start_time", firestore::FirestoreQueryDirection::Descending)]);

        let query = match limit {
            Some(limit) => query.limit(limit),
            None => query,
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn upsert_best_effort(&self, effort: &BestEffort) -> Result<(), AppError> {
        self.put(collections::BEST_EFFORTS, &effort.document_id(), effort)
            .await
    }

    async fn list_best_efforts(&self, user_id: &str) -> Result<Vec<BestEffort>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::BEST_EFFORTS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([(
                "recorded_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl AthleteStore for FirestoreDb {
    async fn get_profile(&self, user_id: &str) -> Result<Option<AthleteProfile>, AppError> {
        self.get(collections::ATHLETE_PROFILES, user_id).await
    }

    async fn upsert_profile(&self, profile: &AthleteProfile) -> Result<(), AppError> {
        self.put(collections::ATHLETE_PROFILES, &profile.user_id, profile)
            .await
    }

    async fn list_events(&self, user_id: &str) -> Result<Vec<CalendarEvent>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::CALENDAR_EVENTS)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([("start_dt", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn create_event(&self, event: &CalendarEvent) -> Result<(), AppError> {
        self.put(collections::CALENDAR_EVENTS, &event.id, event)
            .await
    }

    async fn delete_event(&self, user_id: &str, event_id: &str) -> Result<bool, AppError> {
        // Ownership check before delete; event IDs are not scoped by user.
        let existing: Option<CalendarEvent> =
            self.get(collections::CALENDAR_EVENTS, event_id).await?;

        match existing {
            Some(event) if event.user_id == user_id => {
                self.delete(collections::CALENDAR_EVENTS, event_id).await?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn put_session(&self, session: &PlannedSession) -> Result<(), AppError> {
        self.put(collections::PLANNED_SESSIONS, &session.id, session)
            .await
    }

    async fn get_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<PlannedSession>, AppError> {
        let session: Option<PlannedSession> =
            self.get(collections::PLANNED_SESSIONS, session_id).await?;
        Ok(session.filter(|s| s.user_id == user_id))
    }
}
