//! Local durable queue for notifications the server never received.
//!
//! Backed by a single SQLite table with an auto-incrementing key. Writes go
//! through a one-connection pool, so overlapping enqueues from concurrent push
//! tasks are serialized by SQLite itself.

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tokio::sync::OnceCell;

use crate::error::WorkerError;
use crate::payload::NotificationFields;

pub const STORE_NAME: &str = "pending_notifications";

/// A notification whose remote save failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingRecord {
    pub title: String,
    pub body: String,
    pub notification_id: Option<String>,
    pub username: Option<String>,
    pub timestamp: String,
    pub failed_at: DateTime<Utc>,
}

impl PendingRecord {
    pub fn from_fields(fields: &NotificationFields, failed_at: DateTime<Utc>) -> Self {
        Self {
            title: fields.title.clone(),
            body: fields.body.clone(),
            notification_id: fields.notification_id.clone(),
            username: fields.username.clone(),
            timestamp: fields.timestamp.clone(),
            failed_at,
        }
    }

    /// Rebuild the fields a resubmission sends.
    pub fn to_fields(&self) -> NotificationFields {
        NotificationFields {
            title: self.title.clone(),
            body: self.body.clone(),
            notification_id: self.notification_id.clone(),
            username: self.username.clone(),
            timestamp: self.timestamp.clone(),
            url: None,
        }
    }
}

/// A record as stored, with its queue key.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct QueuedRecord {
    pub id: i64,
    #[sqlx(flatten)]
    pub record: PendingRecord,
}

/// Handle to the opened pending store.
#[derive(Clone)]
pub struct PendingQueue {
    pool: SqlitePool,
}

impl PendingQueue {
    /// Open (creating if absent) the pending store at `url`.
    pub async fn open(url: &str) -> Result<Self, WorkerError> {
        let options = SqliteConnectOptions::from_str(url)?
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);

        // One connection: serializes writers and keeps `sqlite::memory:` alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let queue = Self { pool };
        queue.ensure_store().await?;
        Ok(queue)
    }

    /// Create the store only when it does not exist yet.
    async fn ensure_store(&self) -> Result<(), WorkerError> {
        let existing: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(STORE_NAME)
                .fetch_optional(&self.pool)
                .await?;

        if existing.is_some() {
            return Ok(());
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pending_notifications (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                body            TEXT NOT NULL,
                notification_id TEXT,
                username        TEXT,
                timestamp       TEXT NOT NULL,
                failed_at       TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!(store = STORE_NAME, "Created local pending store");
        Ok(())
    }

    /// Append a record. Returns its queue key.
    pub async fn enqueue(&self, record: &PendingRecord) -> Result<i64, WorkerError> {
        let result = sqlx::query(
            r#"
            INSERT INTO pending_notifications
                (title, body, notification_id, username, timestamp, failed_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.title)
        .bind(&record.body)
        .bind(&record.notification_id)
        .bind(&record.username)
        .bind(&record.timestamp)
        .bind(record.failed_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::info!(
            queue_id = id,
            notification_id = ?record.notification_id,
            "Notification queued for later sync"
        );

        Ok(id)
    }

    /// All queued records, oldest first.
    pub async fn list(&self) -> Result<Vec<QueuedRecord>, WorkerError> {
        let records: Vec<QueuedRecord> =
            sqlx::query_as("SELECT * FROM pending_notifications ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        Ok(records)
    }

    /// Delete a record. Returns true if it existed.
    pub async fn delete(&self, id: i64) -> Result<bool, WorkerError> {
        let result = sqlx::query("DELETE FROM pending_notifications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn len(&self) -> Result<i64, WorkerError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pending_notifications")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    pub async fn is_empty(&self) -> Result<bool, WorkerError> {
        Ok(self.len().await? == 0)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Opens the pending store on first use and hands out the same queue after.
///
/// A failed open is not remembered; the next caller tries again.
pub struct QueueHandle {
    url: String,
    queue: OnceCell<PendingQueue>,
}

impl QueueHandle {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            queue: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> Result<&PendingQueue, WorkerError> {
        self.queue
            .get_or_try_init(|| PendingQueue::open(&self.url))
            .await
    }
}
