// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{http::StatusCode, response::IntoResponse};
use smartcoach::error::AppError;

async fn status_and_code(err: AppError) -> (StatusCode, String) {
    let response = err.into_response();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json["error"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_wahoo_errors_map_to_distinct_codes() {
    let cases = [
        (AppError::NotConnected, StatusCode::CONFLICT, "wahoo_not_connected"),
        (
            AppError::RefreshFailed("invalid_grant".to_string()),
            StatusCode::UNAUTHORIZED,
            "wahoo_reauthorization_required",
        ),
        (
            AppError::FetchFailed {
                status: 503,
                body: "maintenance".to_string(),
            },
            StatusCode::BAD_GATEWAY,
            "wahoo_fetch_failed",
        ),
        (
            AppError::OAuth {
                status: 400,
                body: "bad code".to_string(),
            },
            StatusCode::BAD_GATEWAY,
            "wahoo_oauth_error",
        ),
    ];

    for (err, expected_status, expected_code) in cases {
        let (status, code) = status_and_code(err).await;
        assert_eq!(status, expected_status);
        assert_eq!(code, expected_code);
    }
}

#[tokio::test]
async fn test_fetch_failure_details_keep_upstream_body() {
    let response = AppError::FetchFailed {
        status: 429,
        body: "rate limited".to_string(),
    }
    .into_response();
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["details"], "HTTP 429: rate limited");
}

#[tokio::test]
async fn test_internal_errors_hide_details() {
    let response = AppError::Database("connection reset by peer".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["error"], "database_error");
    assert!(json.get("details").is_none());
}

#[test]
fn test_requires_reauthorization() {
    assert!(AppError::NotConnected.requires_reauthorization());
    assert!(AppError::RefreshFailed("revoked".to_string()).requires_reauthorization());

    assert!(!AppError::FetchFailed {
        status: 401,
        body: String::new()
    }
    .requires_reauthorization());
    assert!(!AppError::WahooApi("timeout".to_string()).requires_reauthorization());
    assert!(!AppError::BadRequest("Bad Request".to_string()).requires_reauthorization());
}
