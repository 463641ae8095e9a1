//! Notification storage and listing routes.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use herald_common::error::AppError;
use herald_common::types::{NotificationPage, SaveNotificationRequest, SaveNotificationResponse};
use herald_engine::notification::{NotificationService, PageRequest};

use crate::middleware::auth::{OptionalSession, SessionUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/notifications/save", post(save_notification))
        .route("/api/notifications/fetch", get(fetch_notifications))
        .route("/api/notifications/{id}/read", post(mark_read))
}

#[derive(Debug, Deserialize)]
pub struct FetchParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// POST /api/notifications/save: Store a notification delivered by push.
///
/// The username in the body wins over the session: the background runtime
/// sends it explicitly because it may run without the page's cookies.
async fn save_notification(
    State(state): State<AppState>,
    session: OptionalSession,
    Json(req): Json<SaveNotificationRequest>,
) -> Result<Json<SaveNotificationResponse>, AppError> {
    let request_id = format!("save_{}", Uuid::new_v4().simple());

    let from_body = req
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());
    let username = from_body.or(session.username()).ok_or_else(|| {
        tracing::warn!(request_id = %request_id, "No username in body or session");
        AppError::Auth("Not authenticated".to_string())
    })?;

    tracing::debug!(
        request_id = %request_id,
        username,
        source = if from_body.is_some() { "body" } else { "session" },
        fcm_message_id = ?req.fcm_message_id,
        timestamp = ?req.timestamp,
        "Save notification requested"
    );

    let title = req
        .notification_title
        .as_deref()
        .ok_or_else(|| AppError::Validation("notification_title is required".to_string()))?;

    let notification = NotificationService::save(&state.pool, username, title).await?;

    Ok(Json(SaveNotificationResponse {
        success: true,
        error: Some(String::new()),
        notification: Some(notification),
    }))
}

/// GET /api/notifications/fetch: Page through the caller's unread notifications.
async fn fetch_notifications(
    State(state): State<AppState>,
    session: SessionUser,
    Query(params): Query<FetchParams>,
) -> Result<Json<NotificationPage>, AppError> {
    let page = PageRequest::from_query(params.page, params.limit)?;
    let result = NotificationService::list_unread(&state.pool, &session.username, page).await?;
    Ok(Json(result))
}

/// POST /api/notifications/{id}/read: Mark one of the caller's notifications as read.
async fn mark_read(
    State(state): State<AppState>,
    session: SessionUser,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    if NotificationService::mark_read(&state.pool, id, &session.username).await? {
        Ok(Json(json!({ "success": true })))
    } else {
        Err(AppError::NotFound(format!("Notification {} not found", id)))
    }
}
