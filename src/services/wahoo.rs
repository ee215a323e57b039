// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wahoo API client and token lifecycle.
//!
//! Handles:
//! - Authorization code exchange and token refresh
//! - Workout listing (envelope or bare list payloads)
//! - One-shot refresh-and-retry when the provider rejects an access token

use crate::config::Config;
use crate::db::TokenStore;
use crate::error::AppError;
use crate::models::{TokenRecord, Workout, WorkoutFilter, WAHOO_PROVIDER};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Scopes requested during authorization.
pub const WAHOO_SCOPES: &str = "user_read workouts_read offline_data";

/// Low-level Wahoo API client.
#[derive(Clone)]
pub struct WahooClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

/// Outcome of a workout listing call that the caller must branch on.
#[derive(Debug)]
pub enum WorkoutListing {
    Listed(Vec<Value>),
    /// The access token was rejected (HTTP 401)
    Unauthorized,
}

impl WahooClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.wahoo_api_base.clone(),
            client_id: config.wahoo_client_id.clone(),
            client_secret: config.wahoo_client_secret.clone(),
            redirect_uri: config.wahoo_redirect_uri.clone(),
        }
    }

    /// Authorization page URL the user is redirected to.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/oauth/authorize?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             state={}",
            self.base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(WAHOO_SCOPES),
            state
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ])
        .await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, AppError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.base_url))
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::WahooApi(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status, "Wahoo token endpoint returned an error");
            return Err(AppError::OAuth { status, body });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::WahooApi(format!("Failed to parse token response: {}", e)))
    }

    /// List the user's workouts with the given access token.
    ///
    /// A 401 is reported as [`WorkoutListing::Unauthorized`] so the caller can
    /// refresh; every other non-2xx is a terminal `FetchFailed`.
    pub async fn list_workouts(&self, access_token: &str) -> Result<WorkoutListing, AppError> {
        let response = self
            .http
            .get(format!("{}/v1/workouts", self.base_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::WahooApi(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(WorkoutListing::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::FetchFailed {
                status: status.as_u16(),
                body,
            });
        }

        let payload: WorkoutsPayload = response
            .json()
            .await
            .map_err(|e| AppError::WahooApi(format!("JSON parse error: {}", e)))?;

        Ok(WorkoutListing::Listed(payload.into_records()))
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Omitted by some refresh responses; the previous one stays valid then.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Seconds until the access token expires
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Build the whole stored record, converting the relative TTL into an
    /// absolute expiry.
    pub fn into_record(
        self,
        user_id: &str,
        previous_refresh_token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<TokenRecord, AppError> {
        let refresh_token = self
            .refresh_token
            .or_else(|| previous_refresh_token.map(str::to_string))
            .ok_or_else(|| {
                AppError::WahooApi("Token response did not include a refresh token".to_string())
            })?;

        let expires_at = Duration::try_seconds(self.expires_in)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::WahooApi(format!(
                    "Token response has out-of-range expires_in: {}",
                    self.expires_in
                ))
            })?;

        Ok(TokenRecord {
            user_id: user_id.to_string(),
            provider: WAHOO_PROVIDER.to_string(),
            access_token: self.access_token,
            refresh_token,
            expires_at,
            scope: self.scope,
        })
    }
}

/// Workout listing body: either `{"workouts": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkoutsPayload {
    Envelope { workouts: Vec<Value> },
    Bare(Vec<Value>),
}

impl WorkoutsPayload {
    fn into_records(self) -> Vec<Value> {
        match self {
            WorkoutsPayload::Envelope { workouts } => workouts,
            WorkoutsPayload::Bare(workouts) => workouts,
        }
    }
}

/// Numeric field that Wahoo sometimes sends as a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Number {
    Float(f64),
    Text(String),
}

impl Number {
    fn value(&self) -> Option<f64> {
        match self {
            Number::Float(v) => Some(*v),
            Number::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RemoteId {
    Int(i64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
struct RemoteSummary {
    duration_active_accum: Option<Number>,
    distance_accum: Option<Number>,
    ascent_accum: Option<Number>,
    heart_rate_avg: Option<Number>,
    power_avg: Option<Number>,
}

/// Remote workout record, tolerant of the field spellings seen in practice.
#[derive(Debug, Deserialize)]
struct RemoteWorkout {
    id: Option<RemoteId>,
    #[serde(alias = "starts")]
    start_time: Option<String>,
    sport: Option<String>,
    workout_type_id: Option<i64>,
    duration_seconds: Option<Number>,
    minutes: Option<Number>,
    distance_m: Option<Number>,
    elevation_m: Option<Number>,
    avg_heart_rate: Option<Number>,
    avg_power: Option<Number>,
    workout_summary: Option<RemoteSummary>,
}

fn sport_from_type_id(type_id: i64) -> &'static str {
    match type_id {
        0 | 12 => "cycling",
        1 | 3 | 5 => "running",
        4 => "trail_running",
        _ => "other",
    }
}

/// Top-level value if present, otherwise the `workout_summary` one.
fn metric(direct: &Option<Number>, summary: &Option<Number>) -> Option<f64> {
    direct
        .as_ref()
        .and_then(Number::value)
        .or_else(|| summary.as_ref().and_then(Number::value))
}

/// Map one remote record into a canonical workout.
///
/// Returns `None` for malformed records and records lacking an ID or start
/// time. Missing optional metrics stay absent.
pub fn workout_from_remote(user_id: &str, raw: Value) -> Option<Workout> {
    let remote = RemoteWorkout::deserialize(&raw).ok()?;

    let provider_activity_id = match remote.id? {
        RemoteId::Int(id) => id.to_string(),
        RemoteId::Text(id) if !id.is_empty() => id,
        RemoteId::Text(_) => return None,
    };
    let start_time = remote.start_time.filter(|s| !s.is_empty())?;

    let summary = remote.workout_summary.unwrap_or_default();

    let duration_seconds = metric(&remote.duration_seconds, &summary.duration_active_accum)
        .or_else(|| remote.minutes.as_ref().and_then(Number::value).map(|m| m * 60.0))
        .map(|secs| secs.round() as i64)
        .unwrap_or(0);

    let sport = remote
        .sport
        .or_else(|| remote.workout_type_id.map(|t| sport_from_type_id(t).to_string()))
        .unwrap_or_else(|| "other".to_string());

    Some(Workout {
        user_id: user_id.to_string(),
        provider: WAHOO_PROVIDER.to_string(),
        provider_activity_id,
        sport,
        start_time,
        duration_seconds,
        distance_m: metric(&remote.distance_m, &summary.distance_accum),
        elevation_m: metric(&remote.elevation_m, &summary.ascent_accum),
        avg_heart_rate: metric(&remote.avg_heart_rate, &summary.heart_rate_avg),
        avg_power: metric(&remote.avg_power, &summary.power_avg),
        raw_metrics: raw,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// WahooService - token lifecycle on top of the client
// ─────────────────────────────────────────────────────────────────────────────

/// High-level Wahoo service owning the token refresh protocol.
#[derive(Clone)]
pub struct WahooService {
    client: WahooClient,
    tokens: Arc<dyn TokenStore>,
}

impl WahooService {
    pub fn new(client: WahooClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self { client, tokens }
    }

    pub fn client(&self) -> &WahooClient {
        &self.client
    }

    /// Exchange the authorization code and persist the user's tokens.
    pub async fn handle_oauth_callback(
        &self,
        user_id: &str,
        code: &str,
    ) -> Result<TokenRecord, AppError> {
        let response = self.client.exchange_code(code).await?;
        let record = response.into_record(user_id, None, Utc::now())?;
        self.tokens.put_tokens(&record).await?;

        tracing::info!(user_id, "Wahoo account connected, tokens stored");
        Ok(record)
    }

    /// Forget the user's Wahoo tokens.
    pub async fn disconnect(&self, user_id: &str) -> Result<(), AppError> {
        self.tokens.delete_tokens(user_id, WAHOO_PROVIDER).await?;
        tracing::info!(user_id, "Wahoo account disconnected");
        Ok(())
    }

    /// Fetch the user's workouts and apply client-side filters.
    pub async fn fetch_workouts(
        &self,
        user_id: &str,
        filter: &WorkoutFilter,
    ) -> Result<Vec<Workout>, AppError> {
        self.fetch_workouts_at(user_id, filter, Utc::now()).await
    }

    /// Same as [`fetch_workouts`](Self::fetch_workouts), with `now` used for
    /// the local expiry check.
    pub async fn fetch_workouts_at(
        &self,
        user_id: &str,
        filter: &WorkoutFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Workout>, AppError> {
        let raw = self.fetch_raw_workouts(user_id, now).await?;

        let total = raw.len();
        let workouts: Vec<Workout> = raw
            .into_iter()
            .filter_map(|record| workout_from_remote(user_id, record))
            .collect();

        if workouts.len() < total {
            tracing::warn!(
                user_id,
                skipped = total - workouts.len(),
                "Skipped Wahoo workouts without an ID or start time"
            );
        }

        Ok(filter.apply(workouts))
    }

    /// Fetch the raw workout records.
    ///
    /// At most one refresh happens per call, whether proactive (expired
    /// locally) or reactive (rejected with 401).
    async fn fetch_raw_workouts(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Value>, AppError> {
        let mut record = self
            .tokens
            .get_tokens(user_id, WAHOO_PROVIDER)
            .await?
            .ok_or(AppError::NotConnected)?;

        let mut refreshed = false;
        if record.is_expired_at(now) {
            tracing::info!(user_id, "Wahoo access token expired, refreshing");
            record = self.refresh_and_store(&record).await?;
            refreshed = true;
        }

        match self.client.list_workouts(&record.access_token).await? {
            WorkoutListing::Listed(workouts) => return Ok(workouts),
            WorkoutListing::Unauthorized if refreshed => {
                return Err(AppError::RefreshFailed(
                    "Refreshed access token was rejected".to_string(),
                ));
            }
            WorkoutListing::Unauthorized => {
                tracing::info!(user_id, "Wahoo rejected access token, refreshing once");
            }
        }

        record = self.refresh_and_store(&record).await?;

        match self.client.list_workouts(&record.access_token).await? {
            WorkoutListing::Listed(workouts) => Ok(workouts),
            WorkoutListing::Unauthorized => Err(AppError::RefreshFailed(
                "Refreshed access token was rejected".to_string(),
            )),
        }
    }

    /// Refresh the access token and replace the stored record.
    async fn refresh_and_store(&self, record: &TokenRecord) -> Result<TokenRecord, AppError> {
        let response = self
            .client
            .refresh_token(&record.refresh_token)
            .await
            .map_err(|e| {
                tracing::warn!(user_id = %record.user_id, error = %e, "Wahoo token refresh failed");
                AppError::RefreshFailed(e.to_string())
            })?;

        let updated = response
            .into_record(&record.user_id, Some(&record.refresh_token), Utc::now())
            .map_err(|e| AppError::RefreshFailed(e.to_string()))?;

        self.tokens.put_tokens(&updated).await?;
        tracing::info!(user_id = %record.user_id, "Wahoo tokens refreshed and stored");
        Ok(updated)
    }
}
