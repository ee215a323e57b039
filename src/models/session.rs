// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Planned training session produced by the coach.

use serde::{Deserialize, Serialize};

/// A single session of a generated training plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSession {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub sport: String,
    /// Day the session is planned for (ISO 8601 date or weekday name)
    pub scheduled_date: Option<String>,
    /// Warmup / intervals / cooldown structure, exported to devices
    #[serde(default)]
    pub structure_json: serde_json::Value,
    /// Intensity targets (zones, % FTP)
    pub targets: Option<serde_json::Value>,
    /// Short explanation of the session's purpose
    pub why: Option<String>,
    pub created_at: String,
}
