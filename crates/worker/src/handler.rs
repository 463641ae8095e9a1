//! Background push handling.
//!
//! For every payload: show the notification, then save it (falling back to the
//! local queue), then tell open windows about it if the save went through.
//! The display happens first so the user sees the notification whatever the
//! network does afterwards.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::WorkerConfig;
use crate::payload::{DisplayedNotification, NotificationFields, PushPayload};
use crate::pipeline::{Fallback, SavePipeline};
use crate::platform::{AnnouncedNotification, NotificationDisplay, WindowClients, WindowMessage};

/// Where a pushed notification ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Saved,
    Failed(Fallback),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub displayed: bool,
    pub save: SaveState,
    pub windows_notified: usize,
}

pub struct BackgroundHandler {
    config: Arc<WorkerConfig>,
    display: Arc<dyn NotificationDisplay>,
    clients: Arc<dyn WindowClients>,
    pipeline: Arc<SavePipeline>,
}

impl BackgroundHandler {
    pub fn new(
        config: Arc<WorkerConfig>,
        display: Arc<dyn NotificationDisplay>,
        clients: Arc<dyn WindowClients>,
        pipeline: Arc<SavePipeline>,
    ) -> Self {
        Self {
            config,
            display,
            clients,
            pipeline,
        }
    }

    pub async fn handle_push(&self, payload: &PushPayload) -> PushOutcome {
        self.handle_push_at(payload, Utc::now()).await
    }

    /// Handle a push as if it arrived at `now`. Never fails; every error is
    /// logged and reflected in the outcome.
    pub async fn handle_push_at(&self, payload: &PushPayload, now: DateTime<Utc>) -> PushOutcome {
        let fields = NotificationFields::extract(payload, &self.config, now);
        let shown = DisplayedNotification::from_fields(&fields, &self.config);

        let displayed = match self.display.show(&shown).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    notification_id = ?fields.notification_id,
                    "Failed to display notification"
                );
                false
            }
        };

        let save = match self.pipeline.save_with_fallback(&fields).await {
            Ok(_) => SaveState::Saved,
            Err(failure) => {
                tracing::warn!(
                    error = %failure,
                    notification_id = ?fields.notification_id,
                    "Notification delivered but not saved remotely"
                );
                SaveState::Failed(failure.fallback)
            }
        };

        // Windows only hear about notifications the server already has
        let windows_notified = if save == SaveState::Saved {
            self.announce(&fields).await
        } else {
            0
        };

        tracing::info!(
            notification_id = ?fields.notification_id,
            displayed,
            ?save,
            windows_notified,
            "Push handled"
        );

        PushOutcome {
            displayed,
            save,
            windows_notified,
        }
    }

    /// Post `NEW_NOTIFICATION` to every open window. Returns how many got it.
    async fn announce(&self, fields: &NotificationFields) -> usize {
        let windows = match self.clients.match_all(true).await {
            Ok(windows) => windows,
            Err(e) => {
                tracing::warn!(error = %e, "Could not enumerate windows");
                return 0;
            }
        };

        let message = WindowMessage::NewNotification {
            notification: AnnouncedNotification {
                title: fields.title.clone(),
                body: fields.body.clone(),
                id: fields.notification_id.clone(),
            },
        };

        let mut delivered = 0;
        for window in &windows {
            match self.clients.post_message(&window.id, &message).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(error = %e, client_id = %window.id, "Failed to notify window")
                }
            }
        }

        delivered
    }
}
