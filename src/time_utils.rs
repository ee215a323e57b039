// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and parsing.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Calendar date of a provider timestamp.
///
/// Accepts RFC3339 (`2024-01-01T10:00:00Z`), naive date-times
/// (`2024-01-01T10:00:00`, `2024-01-01 10:00:00`) and bare dates.
/// Offsets are normalised to UTC before the date is taken.
pub fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// ISO-8601 week label, e.g. `2024-W01`.
///
/// Uses the ISO week-numbering year, so 2024-12-30 is `2025-W01`.
pub fn iso_week_label(date: NaiveDate) -> String {
    let week = date.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}
