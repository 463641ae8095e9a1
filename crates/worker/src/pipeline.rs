//! Remote save with a local fallback.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use herald_common::types::Notification;

use crate::error::WorkerError;
use crate::payload::NotificationFields;
use crate::queue::{PendingRecord, QueueHandle};
use crate::remote::SaveClient;

/// What happened to a notification the server did not take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Stored locally under this queue key.
    Queued(i64),
    /// The local store failed too; the record is gone.
    Lost,
}

/// A failed remote save, together with what the fallback did about it.
#[derive(Debug, Error)]
#[error("{source} (fallback: {fallback:?})")]
pub struct SaveFailure {
    #[source]
    pub source: WorkerError,
    pub fallback: Fallback,
}

pub struct SavePipeline {
    client: SaveClient,
    queue: Arc<QueueHandle>,
}

impl SavePipeline {
    pub fn new(client: SaveClient, queue: Arc<QueueHandle>) -> Self {
        Self { client, queue }
    }

    pub fn client(&self) -> &SaveClient {
        &self.client
    }

    /// Save remotely; on any failure persist locally and hand back the
    /// original error.
    pub async fn save_with_fallback(
        &self,
        fields: &NotificationFields,
    ) -> Result<Option<Notification>, SaveFailure> {
        let source = match self.client.try_save_remote(fields).await {
            Ok(saved) => return Ok(saved),
            Err(e) => e,
        };

        tracing::warn!(
            error = %source,
            notification_id = ?fields.notification_id,
            "Remote save failed, queueing locally"
        );

        let fallback = match self.enqueue(fields).await {
            Ok(id) => Fallback::Queued(id),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    notification_id = ?fields.notification_id,
                    "Local queue unavailable, notification not persisted"
                );
                Fallback::Lost
            }
        };

        Err(SaveFailure { source, fallback })
    }

    async fn enqueue(&self, fields: &NotificationFields) -> Result<i64, WorkerError> {
        let queue = self.queue.get().await?;
        queue
            .enqueue(&PendingRecord::from_fields(fields, Utc::now()))
            .await
    }
}
