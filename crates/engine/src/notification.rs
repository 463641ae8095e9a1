//! Notification service: persistence and paging of in-app notifications.
//!
//! Rows are written by the save endpoint (one per delivered push) and read
//! back by the in-app list, which only ever shows unread (`New`) entries.

use sqlx::PgPool;

use herald_common::error::AppError;
use herald_common::types::{Notification, NotificationPage, NotificationStatus};

/// Titles longer than this are truncated before storage.
pub const MAX_TITLE_CHARS: usize = 500;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

/// Validated pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Build from optional query values. `page` is 1-based; `limit` is capped.
    pub fn from_query(page: Option<u32>, limit: Option<u32>) -> Result<Self, AppError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page == 0 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        if limit == 0 {
            return Err(AppError::Validation("limit must be at least 1".to_string()));
        }

        Ok(Self {
            page,
            limit: limit.min(MAX_LIMIT),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// Whether rows remain beyond this page.
    pub fn has_more(&self, total: i64) -> bool {
        total > self.page as i64 * self.limit as i64
    }
}

/// Service layer for notification records.
pub struct NotificationService;

impl NotificationService {
    /// Trim and truncate a title; empty titles are rejected.
    pub fn sanitize_title(title: &str) -> Result<String, AppError> {
        let sanitized: String = title.trim().chars().take(MAX_TITLE_CHARS).collect();

        if sanitized.is_empty() {
            return Err(AppError::Validation(
                "notification_title cannot be empty".to_string(),
            ));
        }

        Ok(sanitized)
    }

    /// Store a new unread notification for a user.
    pub async fn save(
        pool: &PgPool,
        username: &str,
        title: &str,
    ) -> Result<Notification, AppError> {
        let title = Self::sanitize_title(title)?;

        let notification: Notification = sqlx::query_as(
            r#"
            INSERT INTO notifications (username, notification_title, status, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(&title)
        .bind(NotificationStatus::New)
        .fetch_one(pool)
        .await?;

        tracing::info!(
            notification_id = notification.id,
            username,
            "Notification saved"
        );

        Ok(notification)
    }

    /// One page of a user's unread notifications, newest first.
    pub async fn list_unread(
        pool: &PgPool,
        username: &str,
        page: PageRequest,
    ) -> Result<NotificationPage, AppError> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE username = $1 AND status = $2",
        )
        .bind(username)
        .bind(NotificationStatus::New)
        .fetch_one(pool)
        .await?;

        let notifications: Vec<Notification> = sqlx::query_as(
            r#"
            SELECT * FROM notifications
            WHERE username = $1 AND status = $2
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(username)
        .bind(NotificationStatus::New)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(pool)
        .await?;

        Ok(NotificationPage {
            success: true,
            notifications,
            total_count: total,
            unread_count: total,
            has_more: page.has_more(total),
        })
    }

    /// Mark one of the user's notifications as read. Returns false if none matched.
    pub async fn mark_read(pool: &PgPool, id: i64, username: &str) -> Result<bool, AppError> {
        let result =
            sqlx::query("UPDATE notifications SET status = $1 WHERE id = $2 AND username = $3")
                .bind(NotificationStatus::Read)
                .bind(id)
                .bind(username)
                .execute(pool)
                .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            tracing::info!(notification_id = id, username, "Notification marked as read");
        }

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_trims() {
        let title = NotificationService::sanitize_title("  Нове повідомлення  ").unwrap();
        assert_eq!(title, "Нове повідомлення");
    }

    #[test]
    fn test_sanitize_truncates_by_chars() {
        let long = "ї".repeat(MAX_TITLE_CHARS + 20);
        let title = NotificationService::sanitize_title(&long).unwrap();
        assert_eq!(title.chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn test_sanitize_rejects_blank() {
        let result = NotificationService::sanitize_title("   \n\t");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_page_defaults() {
        let page = PageRequest::from_query(None, None).unwrap();
        assert_eq!(page, PageRequest { page: 1, limit: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_offset_and_cap() {
        let page = PageRequest::from_query(Some(3), Some(500)).unwrap();
        assert_eq!(page.limit, 100);
        assert_eq!(page.offset(), 200);
    }

    #[test]
    fn test_page_zero_rejected() {
        assert!(PageRequest::from_query(Some(0), None).is_err());
        assert!(PageRequest::from_query(None, Some(0)).is_err());
    }

    #[test]
    fn test_has_more() {
        let page = PageRequest { page: 1, limit: 10 };
        assert!(!page.has_more(10));
        assert!(page.has_more(11));

        let second = PageRequest { page: 2, limit: 10 };
        assert!(!second.has_more(11));
    }
}
