// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod analytics;
pub mod coach;
pub mod llm;
pub mod sync;
pub mod wahoo;

pub use coach::{CoachService, GeneratedPlan};
pub use llm::{ChatClient, ChatMessage, Role};
pub use sync::{SyncService, SyncSummary};
pub use wahoo::{WahooClient, WahooService};
