// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::response::Response;
use chrono::{DateTime, Utc};
use smartcoach::config::Config;
use smartcoach::db::{FirestoreDb, MemoryDb};
use smartcoach::models::{TokenRecord, Workout, WAHOO_PROVIDER};
use smartcoach::routes::create_router;
use smartcoach::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test config with the Wahoo and LLM hosts pointed at a mock server.
#[allow(dead_code)]
pub fn test_config(mock_url: &str) -> Config {
    Config {
        wahoo_api_base: mock_url.to_string(),
        llm_base_url: mock_url.to_string(),
        ..Config::test_default()
    }
}

/// Create a test app on an in-memory datastore.
/// Returns the router, the shared state and the datastore for seeding.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>, Arc<MemoryDb>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(
    config: Config,
) -> (axum::Router, Arc<AppState>, Arc<MemoryDb>) {
    let db = Arc::new(MemoryDb::new());
    let state = AppState::new(config, db.clone());
    (create_router(state.clone()), state, db)
}

/// Create a test JWT token.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    smartcoach::middleware::auth::create_jwt(user_id, signing_key).unwrap()
}

/// Bearer header value for a user under the default test key.
#[allow(dead_code)]
pub fn bearer(user_id: &str) -> String {
    format!(
        "Bearer {}",
        create_test_jwt(user_id, &Config::test_default().jwt_signing_key)
    )
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[allow(dead_code)]
pub fn token_record(
    user_id: &str,
    access_token: &str,
    refresh_token: &str,
    expires_at: DateTime<Utc>,
) -> TokenRecord {
    TokenRecord {
        user_id: user_id.to_string(),
        provider: WAHOO_PROVIDER.to_string(),
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        expires_at,
        scope: Some("user_read workouts_read offline_data".to_string()),
    }
}

#[allow(dead_code)]
pub fn workout(user_id: &str, id: &str, sport: &str, duration_seconds: i64, start: &str) -> Workout {
    Workout {
        user_id: user_id.to_string(),
        provider: WAHOO_PROVIDER.to_string(),
        provider_activity_id: id.to_string(),
        sport: sport.to_string(),
        start_time: start.to_string(),
        duration_seconds,
        distance_m: None,
        elevation_m: None,
        avg_heart_rate: None,
        avg_power: None,
        raw_metrics: serde_json::Value::Null,
    }
}

/// JSON body of a successful token endpoint response.
#[allow(dead_code)]
pub fn token_body(access_token: &str, refresh_token: Option<&str>) -> String {
    let mut body = serde_json::json!({
        "access_token": access_token,
        "expires_in": 7200,
        "scope": "user_read workouts_read offline_data",
        "token_type": "Bearer"
    });
    if let Some(refresh) = refresh_token {
        body["refresh_token"] = refresh.into();
    }
    body.to_string()
}
