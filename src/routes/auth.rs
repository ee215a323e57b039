// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wahoo OAuth routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Extension, Router,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

/// Callback route; Wahoo redirects the browser here without our session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/wahoo/callback", get(auth_callback))
}

/// Authorization start; needs the signed-in user to bind into `state`.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/wahoo", get(auth_start))
}

/// Start OAuth flow - redirect to Wahoo authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Redirect> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    let oauth_state = sign_state(&user.user_id, timestamp, &state.config.oauth_state_key)?;
    let auth_url = state.wahoo.client().authorize_url(&oauth_state);

    tracing::info!(
        user_id = %user.user_id,
        client_id = %state.config.wahoo_client_id,
        "Starting OAuth flow, redirecting to Wahoo"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OAuth callback - exchange code for tokens, then run the first sync.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect> {
    let frontend_url = &state.config.frontend_url;

    // Check for OAuth errors
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from Wahoo");
        let redirect = format!("{}?error={}", frontend_url, urlencoding::encode(&error));
        return Ok(Redirect::temporary(&redirect));
    }

    let user_id = params
        .state
        .as_deref()
        .and_then(|s| verify_state(s, &state.config.oauth_state_key))
        .ok_or_else(|| AppError::BadRequest("Invalid OAuth state".to_string()))?;

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing authorization code".to_string()))?;

    tracing::info!(user_id = %user_id, "Exchanging authorization code for tokens");
    state.wahoo.handle_oauth_callback(&user_id, &code).await?;

    // Initial import; the user can always retry with POST /api/sync
    if let Err(e) = state.sync.sync_workouts(&user_id).await {
        tracing::warn!(user_id = %user_id, error = %e, "Initial sync failed, continuing anyway");
    }

    let redirect_url = format!("{}?wahoo=connected", frontend_url);
    Ok(Redirect::temporary(&redirect_url))
}

/// Build the OAuth `state`: base64url("user_id|timestamp_hex|signature_hex").
pub fn sign_state(user_id: &str, timestamp_ms: u128, secret: &[u8]) -> Result<String> {
    let payload = format!("{}|{:x}", user_id, timestamp_ms);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    let signed_state = format!("{}|{}", payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed_state.as_bytes()))
}

/// Verify the HMAC signature and return the user ID bound into `state`.
pub fn verify_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Split from the right; user IDs may themselves contain '|'
    let mut parts = state_str.rsplitn(3, '|');
    let signature_hex = parts.next()?;
    let timestamp_hex = parts.next()?;
    let user_id = parts.next()?;

    if user_id.is_empty() || u128::from_str_radix(timestamp_hex, 16).is_err() {
        return None;
    }

    let signature = hex::decode(signature_hex).ok()?;

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(format!("{}|{}", user_id, timestamp_hex).as_bytes());

    // Constant-time comparison
    if mac.verify_slice(&signature).is_err() {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(user_id.to_string())
}
