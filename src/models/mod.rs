// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod athlete;
pub mod load;
pub mod session;
pub mod token;
pub mod workout;

pub use athlete::{AthleteProfile, CalendarEvent, NewCalendarEvent, ProfileUpdate};
pub use load::{BestEffort, TrendTag, WeeklyLoadBucket};
pub use session::PlannedSession;
pub use token::{TokenRecord, WAHOO_PROVIDER};
pub use workout::{Workout, WorkoutFilter};

/// Join key parts into a document ID.
///
/// Parts are percent-encoded with `_` escaped as well, so `_` only ever
/// appears as the separator and distinct keys never share an ID.
pub fn document_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|part| urlencoding::encode(part).replace('_', "%5F"))
        .collect::<Vec<_>>()
        .join("_")
}
