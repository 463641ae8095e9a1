use std::sync::Arc;

use crate::click::{ClickDispatcher, ClickOutcome};
use crate::config::WorkerConfig;
use crate::drain::{DrainReport, QueueDrainer};
use crate::error::WorkerError;
use crate::handler::{BackgroundHandler, PushOutcome};
use crate::payload::{DisplayedNotification, PushPayload};
use crate::pipeline::SavePipeline;
use crate::platform::{InboundMessage, NotificationDisplay, WindowClients, WorkerScope};
use crate::queue::QueueHandle;
use crate::remote::SaveClient;

/// Event entry points of the background delivery runtime.
///
/// Every entry point awaits all of its side effects before returning and
/// never returns an error; failures are logged where they happen.
pub struct ServiceWorker {
    handler: BackgroundHandler,
    clicks: ClickDispatcher,
    drainer: QueueDrainer,
    scope: Arc<dyn WorkerScope>,
}

impl ServiceWorker {
    pub fn new(
        config: WorkerConfig,
        display: Arc<dyn NotificationDisplay>,
        clients: Arc<dyn WindowClients>,
        scope: Arc<dyn WorkerScope>,
    ) -> Result<Self, WorkerError> {
        let config = Arc::new(config);
        let queue = Arc::new(QueueHandle::new(config.queue_url.clone()));
        let pipeline = Arc::new(SavePipeline::new(
            SaveClient::new(&config)?,
            Arc::clone(&queue),
        ));

        Ok(Self {
            handler: BackgroundHandler::new(
                Arc::clone(&config),
                Arc::clone(&display),
                Arc::clone(&clients),
                Arc::clone(&pipeline),
            ),
            clicks: ClickDispatcher::new(config, display, clients),
            drainer: QueueDrainer::new(pipeline, queue),
            scope,
        })
    }

    /// Build from `HERALD_*` environment variables.
    pub fn from_env(
        display: Arc<dyn NotificationDisplay>,
        clients: Arc<dyn WindowClients>,
        scope: Arc<dyn WorkerScope>,
    ) -> anyhow::Result<Self> {
        let config = WorkerConfig::from_env()?;
        tracing::info!(save_url = %config.save_url, queue_url = %config.queue_url, "Worker configured");
        Ok(Self::new(config, display, clients, scope)?)
    }

    pub async fn on_push(&self, payload: &PushPayload) -> PushOutcome {
        self.handler.handle_push(payload).await
    }

    /// Raw push body. Anything unparseable is handled as an empty payload so
    /// the user still sees a notification.
    pub async fn on_push_json(&self, raw: &str) -> PushOutcome {
        let payload = serde_json::from_str::<PushPayload>(raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Unreadable push payload, using defaults");
            PushPayload::default()
        });
        self.handler.handle_push(&payload).await
    }

    pub async fn on_notification_click(&self, notification: &DisplayedNotification) -> ClickOutcome {
        self.clicks.handle_click(notification).await
    }

    /// A message posted by a window. Unknown messages are ignored.
    pub async fn on_message(&self, message: serde_json::Value) {
        let message = match serde_json::from_value::<InboundMessage>(message) {
            Ok(message) => message,
            Err(_) => {
                tracing::debug!("Ignoring unknown window message");
                return;
            }
        };

        match message {
            InboundMessage::SkipWaiting => {
                if let Err(e) = self.scope.skip_waiting().await {
                    tracing::error!(error = %e, "skip_waiting failed");
                }
            }
            InboundMessage::ClientReady => {
                self.drain().await;
            }
        }
    }

    pub async fn on_activate(&self) -> Option<DrainReport> {
        tracing::info!("Worker activated");
        self.drain().await
    }

    async fn drain(&self) -> Option<DrainReport> {
        match self.drainer.drain().await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(error = %e, "Queue drain failed");
                None
            }
        }
    }
}
