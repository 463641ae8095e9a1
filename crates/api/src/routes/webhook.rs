//! Webhook that pushes a notification to a user's device.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use herald_common::error::AppError;
use herald_engine::dispatch::PushDispatcher;

use crate::middleware::auth::OptionalSession;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/notifications/webhook", post(send_push))
}

#[derive(Debug, Deserialize)]
pub struct WebhookRequest {
    pub username: Option<String>,
    pub notification_title: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub success: bool,
    pub fcm_message_id: String,
    pub error: Option<String>,
}

/// POST /api/notifications/webhook: Send an FCM push to a user.
///
/// The username falls back to the session when the body omits it.
async fn send_push(
    State(state): State<AppState>,
    session: OptionalSession,
    Json(req): Json<WebhookRequest>,
) -> Result<Json<WebhookResponse>, AppError> {
    let request_id = format!("req_{}", Uuid::new_v4().simple());

    let username = req
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .or(session.username());
    let title = req
        .notification_title
        .as_deref()
        .filter(|t| !t.trim().is_empty());

    let (Some(username), Some(title)) = (username, title) else {
        return Err(AppError::Validation(
            "username and notification_title are required".to_string(),
        ));
    };

    tracing::info!(request_id = %request_id, username, "Sending FCM message");

    let dispatched = PushDispatcher::dispatch(
        &state.pool,
        &state.messaging,
        username,
        title,
        &state.config.fcm_click_link,
    )
    .await?;

    Ok(Json(WebhookResponse {
        success: true,
        fcm_message_id: dispatched.fcm_message_id,
        error: None,
    }))
}
