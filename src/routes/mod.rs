// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.
//!
//! `/health` and the OAuth entry points are public. Everything else sits
//! behind [`require_auth`].

pub mod api;
pub mod auth;
pub mod coach;
pub mod wahoo;

use crate::middleware::{add_security_headers, require_auth};
use crate::AppState;
use axum::http::{header, request::Parts, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub build_id: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        build_id: option_env!("BUILD_ID").unwrap_or("unknown"),
    })
}

/// Origins served by a local dev server.
fn is_loopback_origin(origin: &str) -> bool {
    origin.starts_with("http://localhost") || origin.starts_with("http://127.0.0.1")
}

/// CORS for the web client. Credentials are allowed so the session cookie
/// reaches the API.
fn cors_layer(frontend_url: String) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                let origin = origin.to_str().unwrap_or("");
                origin == frontend_url || is_loopback_origin(origin)
            },
        ))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .merge(auth::public_routes());

    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(api::routes())
        .merge(wahoo::routes())
        .merge(coach::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(add_security_headers))
        .layer(cors_layer(state.config.frontend_url.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
