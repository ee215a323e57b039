// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use std::env;

const DEFAULT_WAHOO_API_BASE: &str = "https://api.wahooligan.com";
const DEFAULT_LLM_BASE_URL: &str = "https://api.deepseek.com";
const DEFAULT_LLM_MODEL: &str = "deepseek-chat";

/// Which datastore backs the token, workout and athlete stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StorageBackend::Firestore),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Wahoo OAuth client ID (public)
    pub wahoo_client_id: String,
    /// Redirect URI registered with Wahoo
    pub wahoo_redirect_uri: String,
    /// Wahoo API host (token, authorize and workout endpoints hang off it)
    pub wahoo_api_base: String,
    /// Frontend URL for OAuth redirects
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub storage_backend: StorageBackend,
    /// OpenAI-compatible chat completions host
    pub llm_base_url: String,
    pub llm_model: String,

    // --- Secrets ---
    /// Wahoo OAuth client secret
    pub wahoo_client_secret: String,
    /// HS256 key used by the identity provider to sign session tokens
    pub jwt_signing_key: Vec<u8>,
    /// HMAC key for the OAuth `state` parameter
    pub oauth_state_key: Vec<u8>,
    /// Chat completions API key (coach features are disabled without it)
    pub llm_api_key: Option<String>,
}

impl Config {
    /// Deterministic configuration for tests.
    pub fn test_default() -> Self {
        Self {
            wahoo_client_id: "test_client_id".to_string(),
            wahoo_redirect_uri: "http://localhost:8080/auth/wahoo/callback".to_string(),
            wahoo_api_base: "http://127.0.0.1:9".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            llm_base_url: "http://127.0.0.1:9".to_string(),
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            wahoo_client_secret: "test_secret".to_string(),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            oauth_state_key: b"test_state_key".to_vec(),
            llm_api_key: Some("test_llm_key".to_string()),
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            wahoo_client_id: required("WAHOO_CLIENT_ID")?,
            wahoo_redirect_uri: env::var("WAHOO_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:8080/auth/wahoo/callback".to_string()),
            wahoo_api_base: env::var("WAHOO_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_WAHOO_API_BASE.to_string()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage_backend: env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,
            llm_base_url: env::var("LLM_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),

            wahoo_client_secret: required("WAHOO_CLIENT_SECRET")?,
            jwt_signing_key: required("JWT_SIGNING_KEY")?.into_bytes(),
            oauth_state_key: required("OAUTH_STATE_KEY")?.into_bytes(),
            llm_api_key: env::var("LLM_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
