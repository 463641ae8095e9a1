//! Push dispatch: turns a webhook call into an FCM message for one user.
//!
//! 1. Look up the user's registration token
//! 2. Build a message carrying both a display block and a data block
//! 3. Send through the shared messaging handle
//! 4. Forget tokens the provider reports as stale

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use herald_common::error::AppError;
use herald_notifier::{Messaging, PushError, PushMessage};

use crate::token::TokenService;

/// Product name shown as the title of every push.
pub const PRODUCT_NAME: &str = "СВУП";

/// Outcome of a successful dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub notification_id: String,
    pub fcm_message_id: String,
}

/// Sends webhook-triggered pushes.
pub struct PushDispatcher;

impl PushDispatcher {
    /// Generate an opaque id the background runtime echoes back on save.
    pub fn new_notification_id(now: DateTime<Utc>) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("notif_{}_{}", now.timestamp_millis(), &suffix[..9])
    }

    /// Build the provider message for one user.
    ///
    /// The `notification` block lets the provider render something even when
    /// no background handler runs; the `data` block is what the handler reads.
    pub fn build_message(
        fcm_token: &str,
        username: &str,
        title: &str,
        notification_id: &str,
        link: &str,
        now: DateTime<Utc>,
    ) -> PushMessage {
        PushMessage::new(fcm_token)
            .with_notification(PRODUCT_NAME, title)
            .with_data("notificationBody", title)
            .with_data("notificationId", notification_id)
            .with_data("username", username)
            .with_data("timestamp", now.to_rfc3339())
            .with_link(link)
    }

    /// Map a provider failure to the HTTP-facing error.
    pub fn map_push_error(error: &PushError) -> AppError {
        match error {
            PushError::InvalidToken(_) | PushError::TokenNotRegistered(_) => {
                AppError::Gone("Invalid or expired FCM token (token removed)".to_string())
            }
            PushError::QuotaExceeded(_) => {
                AppError::RateLimited("FCM quota exceeded, please try again later".to_string())
            }
            PushError::Authentication(_) => AppError::Push("FCM authentication failed".to_string()),
            other => AppError::Push(format!("FCM send failed: {}", other)),
        }
    }

    /// Send a push to `username`.
    pub async fn dispatch(
        pool: &PgPool,
        messaging: &Messaging,
        username: &str,
        title: &str,
        link: &str,
    ) -> Result<Dispatched, AppError> {
        let record = TokenService::find_by_username(pool, username)
            .await?
            .ok_or_else(|| AppError::NotFound("No FCM token registered for user".to_string()))?;

        let now = Utc::now();
        let notification_id = Self::new_notification_id(now);
        let message = Self::build_message(
            &record.fcm_token,
            username,
            title,
            &notification_id,
            link,
            now,
        );

        let sent = match messaging.sender().await {
            Ok(sender) => sender.send(&message).await,
            Err(e) => Err(e),
        };

        match sent {
            Ok(fcm_message_id) => {
                tracing::info!(
                    username,
                    notification_id = %notification_id,
                    fcm_message_id = %fcm_message_id,
                    "FCM message sent"
                );
                Ok(Dispatched {
                    notification_id,
                    fcm_message_id,
                })
            }
            Err(e) => {
                tracing::error!(username, error = %e, "FCM send failed");

                if e.is_stale_token()
                    && let Err(delete_err) = TokenService::delete_by_username(pool, username).await
                {
                    tracing::error!(
                        username,
                        error = %delete_err,
                        "Failed to delete invalid token"
                    );
                }

                Err(Self::map_push_error(&e))
            }
        }
    }
}
