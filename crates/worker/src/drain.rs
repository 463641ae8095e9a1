//! Resubmits locally queued notifications to the server.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::WorkerError;
use crate::pipeline::SavePipeline;
use crate::queue::QueueHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    pub resubmitted: usize,
    /// Records the server refused outright; dropped from the queue.
    pub discarded: usize,
    pub remaining: usize,
}

/// Drains the pending store oldest-first, one drain at a time.
///
/// Records go back through the plain remote save, never the fallback. A
/// record the server refuses outright (a 4xx other than 408/429) is dropped
/// so it cannot block the records behind it; any other failure keeps the
/// record and stops the drain there.
pub struct QueueDrainer {
    pipeline: Arc<SavePipeline>,
    queue: Arc<QueueHandle>,
    running: Mutex<()>,
}

impl QueueDrainer {
    pub fn new(pipeline: Arc<SavePipeline>, queue: Arc<QueueHandle>) -> Self {
        Self {
            pipeline,
            queue,
            running: Mutex::new(()),
        }
    }

    /// Returns `Ok(None)` if another drain is already in progress.
    pub async fn drain(&self) -> Result<Option<DrainReport>, WorkerError> {
        let Ok(_guard) = self.running.try_lock() else {
            tracing::debug!("Queue drain already running, skipping");
            return Ok(None);
        };

        let queue = self.queue.get().await?;
        let pending = queue.list().await?;
        if pending.is_empty() {
            return Ok(Some(DrainReport::default()));
        }

        tracing::info!(count = pending.len(), "Draining pending notifications");

        let mut report = DrainReport::default();
        for (index, queued) in pending.iter().enumerate() {
            let fields = queued.record.to_fields();
            match self.pipeline.client().try_save_remote(&fields).await {
                Ok(_) => report.resubmitted += 1,
                Err(e) if e.is_permanent_rejection() => {
                    tracing::warn!(
                        error = %e,
                        queue_id = queued.id,
                        notification_id = ?queued.record.notification_id,
                        "Server refused queued notification, dropping it"
                    );
                    report.discarded += 1;
                }
                Err(e) => {
                    report.remaining = pending.len() - index;
                    tracing::warn!(
                        error = %e,
                        queue_id = queued.id,
                        remaining = report.remaining,
                        "Resubmission failed, keeping the rest queued"
                    );
                    break;
                }
            }

            // A record left behind here is sent again on the next drain
            if let Err(e) = queue.delete(queued.id).await {
                tracing::error!(error = %e, queue_id = queued.id, "Failed to remove drained record");
            }
        }

        tracing::info!(
            resubmitted = report.resubmitted,
            discarded = report.discarded,
            remaining = report.remaining,
            "Queue drain finished"
        );
        Ok(Some(report))
    }
}
