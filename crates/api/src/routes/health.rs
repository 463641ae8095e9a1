//! Liveness probe. Also reports whether the push client has been built yet,
//! which happens lazily on the first webhook call.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub push_ready: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        service: "herald-api",
        version: env!("CARGO_PKG_VERSION"),
        push_ready: state.messaging.is_initialised(),
    })
}
