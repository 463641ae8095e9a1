//! Shared application state for the Axum API server.

use std::sync::Arc;

use herald_common::config::AppConfig;
use herald_notifier::Messaging;
use sqlx::PgPool;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: AppConfig,
    pub messaging: Arc<Messaging>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig, messaging: Arc<Messaging>) -> Self {
        Self {
            pool,
            config,
            messaging,
        }
    }
}
