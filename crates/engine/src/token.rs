//! FCM token registry: one registration token per username.

use sqlx::PgPool;

use herald_common::error::AppError;
use herald_common::types::FcmToken;

/// Service layer for FCM registration tokens.
pub struct TokenService;

impl TokenService {
    /// Register (or replace) the token for a user.
    pub async fn upsert(pool: &PgPool, username: &str, token: &str) -> Result<FcmToken, AppError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::Validation("fcm_token is required".to_string()));
        }

        let record: FcmToken = sqlx::query_as(
            r#"
            INSERT INTO fcm_tokens (username, fcm_token, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (username) DO UPDATE
                SET fcm_token = EXCLUDED.fcm_token, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(token)
        .fetch_one(pool)
        .await?;

        tracing::info!(username, "FCM token registered");
        Ok(record)
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<FcmToken>, AppError> {
        let record: Option<FcmToken> =
            sqlx::query_as("SELECT * FROM fcm_tokens WHERE username = $1")
                .bind(username)
                .fetch_optional(pool)
                .await?;

        Ok(record)
    }

    /// Forget a user's token. Returns true if a row was removed.
    pub async fn delete_by_username(pool: &PgPool, username: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM fcm_tokens WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(username, "FCM token removed");
        }

        Ok(deleted)
    }
}
