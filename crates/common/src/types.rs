use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read state of a stored notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum NotificationStatus {
    New,
    Read,
}

impl std::fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationStatus::New => write!(f, "New"),
            NotificationStatus::Read => write!(f, "Read"),
        }
    }
}

/// A notification stored for in-app display.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: i64,
    pub username: String,
    pub notification_title: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}

/// A user's FCM registration token. One token per username.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FcmToken {
    pub id: i64,
    pub username: String,
    pub fcm_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body accepted by the save endpoint.
///
/// The background runtime fills `username` itself because it cannot rely on
/// the page session being attached to every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveNotificationRequest {
    pub notification_title: Option<String>,
    pub fcm_message_id: Option<String>,
    pub username: Option<String>,
    pub timestamp: Option<String>,
}

/// Response body returned by the save endpoint on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveNotificationResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub notification: Option<Notification>,
}

/// Paginated page of unread notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub success: bool,
    pub notifications: Vec<Notification>,
    pub total_count: i64,
    pub unread_count: i64,
    pub has_more: bool,
}
