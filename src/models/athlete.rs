// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Athlete profile and calendar models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Athlete profile, one per user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    pub user_id: String,
    pub age: Option<u32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    /// Primary discipline ("cycling", "trail_running", ...)
    pub sport_focus: Option<String>,
    /// Functional threshold power (watts)
    pub ftp_w: Option<u32>,
    pub vo2max: Option<f64>,
    pub zones_power_json: Option<serde_json::Value>,
    pub zones_hr_json: Option<serde_json::Value>,
    pub settings: Option<serde_json::Value>,
    #[serde(default)]
    pub updated_at: String,
}

/// Partial profile update. Only provided fields overwrite the stored profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub age: Option<u32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub sport_focus: Option<String>,
    pub ftp_w: Option<u32>,
    pub vo2max: Option<f64>,
    pub zones_power_json: Option<serde_json::Value>,
    pub zones_hr_json: Option<serde_json::Value>,
    pub settings: Option<serde_json::Value>,
}

impl AthleteProfile {
    /// Merge an update into this profile.
    pub fn apply(&mut self, update: ProfileUpdate, now: &str) {
        self.age = update.age.or(self.age);
        self.height_cm = update.height_cm.or(self.height_cm);
        self.weight_kg = update.weight_kg.or(self.weight_kg);
        self.sport_focus = update.sport_focus.or(self.sport_focus.take());
        self.ftp_w = update.ftp_w.or(self.ftp_w);
        self.vo2max = update.vo2max.or(self.vo2max);
        self.zones_power_json = update.zones_power_json.or(self.zones_power_json.take());
        self.zones_hr_json = update.zones_hr_json.or(self.zones_hr_json.take());
        self.settings = update.settings.or(self.settings.take());
        self.updated_at = now.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Race,
    Social,
    Health,
    Personal,
}

/// Race priority (A = season goal).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    A,
    B,
    C,
}

/// Calendar event stored for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub title: String,
    pub start_dt: DateTime<Utc>,
    pub end_dt: Option<DateTime<Utc>>,
    #[serde(default)]
    pub details_json: serde_json::Value,
    pub priority: Option<Priority>,
    #[serde(default)]
    pub constraints_json: serde_json::Value,
}

/// Request body for creating a calendar event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewCalendarEvent {
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub start_dt: DateTime<Utc>,
    pub end_dt: Option<DateTime<Utc>>,
    #[serde(default = "empty_object")]
    pub details_json: serde_json::Value,
    pub priority: Option<Priority>,
    #[serde(default = "empty_object")]
    pub constraints_json: serde_json::Value,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl NewCalendarEvent {
    pub fn into_event(self, id: String, user_id: &str) -> CalendarEvent {
        CalendarEvent {
            id,
            user_id: user_id.to_string(),
            event_type: self.event_type,
            title: self.title,
            start_dt: self.start_dt,
            end_dt: self.end_dt,
            details_json: self.details_json,
            priority: self.priority,
            constraints_json: self.constraints_json,
        }
    }
}
