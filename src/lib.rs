// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SmartCoach: training backend for Wahoo-connected athletes
//!
//! This crate provides the backend API that syncs workouts from Wahoo,
//! computes training load, and forwards athlete context to an AI coach.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{ChatClient, CoachService, SyncService, WahooClient, WahooService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
    pub wahoo: WahooService,
    pub sync: SyncService,
    pub coach: CoachService,
}

impl AppState {
    /// Wire every service to the given datastore.
    pub fn new<D: Database + 'static>(config: Config, db: Arc<D>) -> Arc<Self> {
        let wahoo = WahooService::new(WahooClient::new(&config), db.clone());
        let sync = SyncService::new(wahoo.clone(), db.clone());
        let coach = CoachService::new(ChatClient::new(&config), db.clone());

        Arc::new(Self {
            config,
            db,
            wahoo,
            sync,
            coach,
        })
    }
}
