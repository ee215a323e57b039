// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API authentication and CORS tests.
//!
//! These tests verify that:
//! 1. Protected routes reject requests without valid tokens
//! 2. Protected routes accept a bearer token or the session cookie
//! 3. CORS preflight requests return correct headers
//! 4. The OAuth start redirect carries a state bound to the caller

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use smartcoach::config::Config;
use smartcoach::middleware::auth::{Claims, SESSION_COOKIE};
use smartcoach::routes::auth::verify_state;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

mod common;

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_protected_route_without_token() {
    let (app, _, _) = common::create_test_app();

    let response = app.oneshot(get("/api/workouts")).await.unwrap();

    // Should return 401 Unauthorized without token
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_invalid_token() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/workouts")
                .header(header::AUTHORIZATION, "Bearer invalid.token.here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_expired_token() {
    let (app, _, _) = common::create_test_app();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: "user-1".to_string(),
        exp: now - 3600,
        iat: now - 7200,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&Config::test_default().jwt_signing_key),
    )
    .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/workouts")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_key_rejected() {
    let (app, _, _) = common::create_test_app();
    let token = common::create_test_jwt("user-1", b"some_other_signing_key_entirely");

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/workouts")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/workouts")
                .header(header::AUTHORIZATION, common::bearer("user-1"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_protected_route_with_session_cookie() {
    let (app, _, _) = common::create_test_app();
    let token = common::create_test_jwt("user-1", &Config::test_default().jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/workouts")
                .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_cors_preflight() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/workouts")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // OPTIONS should return 200 (CORS preflight success)
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:5173"
    );
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let (app, _, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/workouts")
                .header(header::ORIGIN, "https://evil.example.com")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(!response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_health_is_public_with_security_headers() {
    let (app, _, _) = common::create_test_app();

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "DENY");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");

    let body = common::body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_oauth_start_requires_auth() {
    let (app, _, _) = common::create_test_app();

    let response = app.oneshot(get("/auth/wahoo")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_oauth_start_redirects_with_signed_state() {
    let (app, state, _) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/auth/wahoo")
                .header(header::AUTHORIZATION, common::bearer("user-42"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with(&format!("{}/oauth/authorize?", state.config.wahoo_api_base)));
    assert!(location.contains("client_id=test_client_id"));
    assert!(location.contains("response_type=code"));

    let oauth_state = location
        .split('&')
        .find_map(|pair| pair.split_once("state=").map(|(_, v)| v))
        .unwrap();
    let oauth_state = urlencoding::decode(oauth_state).unwrap();
    assert_eq!(
        verify_state(&oauth_state, &state.config.oauth_state_key),
        Some("user-42".to_string())
    );
}
