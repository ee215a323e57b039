// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stored OAuth tokens for a connected provider account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider identifier for Wahoo-sourced tokens and workouts.
pub const WAHOO_PROVIDER: &str = "wahoo";

/// OAuth tokens for one user and one provider.
///
/// Always written as a whole record; a refresh replaces every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub user_id: String,
    pub provider: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token
    pub expires_at: DateTime<Utc>,
    /// Granted OAuth scopes, as returned by the provider
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenRecord {
    /// Document key, one record per (user, provider).
    pub fn document_id(&self) -> String {
        token_document_id(&self.user_id, &self.provider)
    }

    /// Whether the access token must be refreshed before use.
    ///
    /// The boundary is inclusive: a token expiring exactly at `now` is expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub fn token_document_id(user_id: &str, provider: &str) -> String {
    super::document_key(&[user_id, provider])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(expires_at: DateTime<Utc>) -> TokenRecord {
        TokenRecord {
            user_id: "user-1".to_string(),
            provider: WAHOO_PROVIDER.to_string(),
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
            scope: None,
        }
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let now = Utc::now();
        assert!(record(now).is_expired_at(now));
        assert!(record(now - Duration::seconds(1)).is_expired_at(now));
        assert!(!record(now + Duration::seconds(1)).is_expired_at(now));
    }

    #[test]
    fn test_document_id() {
        assert_eq!(record(Utc::now()).document_id(), "user-1_wahoo");
    }
}
