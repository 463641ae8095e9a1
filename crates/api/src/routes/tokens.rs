//! FCM token registration.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use herald_common::error::AppError;
use herald_engine::token::TokenService;

use crate::middleware::auth::SessionUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/fcm-token", post(register_token))
}

#[derive(Debug, Deserialize)]
pub struct RegisterTokenRequest {
    pub fcm_token: String,
}

/// POST /api/fcm-token: Register or replace the caller's FCM token.
async fn register_token(
    State(state): State<AppState>,
    session: SessionUser,
    Json(req): Json<RegisterTokenRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    TokenService::upsert(&state.pool, &session.username, &req.fcm_token).await?;
    Ok(Json(json!({ "success": true })))
}
