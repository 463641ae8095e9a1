//! Notification click handling: focus the window already showing the target
//! route, or open one.

use std::sync::Arc;

use url::Url;

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::payload::DisplayedNotification;
use crate::platform::{NotificationDisplay, WindowClients};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An existing window (by client id) was focused.
    Focused(String),
    /// A new window was opened at this URL.
    Opened(String),
    Failed,
}

/// Whether two URLs point at the same route: same origin and path, ignoring a
/// trailing slash, the query and the fragment.
pub fn same_route(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin() && a.path().trim_end_matches('/') == b.path().trim_end_matches('/')
}

pub struct ClickDispatcher {
    config: Arc<WorkerConfig>,
    display: Arc<dyn NotificationDisplay>,
    clients: Arc<dyn WindowClients>,
}

impl ClickDispatcher {
    pub fn new(
        config: Arc<WorkerConfig>,
        display: Arc<dyn NotificationDisplay>,
        clients: Arc<dyn WindowClients>,
    ) -> Self {
        Self {
            config,
            display,
            clients,
        }
    }

    /// Absolute URL to navigate to, resolved against the application origin.
    pub fn resolve_target(&self, notification: &DisplayedNotification) -> Result<Url, WorkerError> {
        let target = notification
            .data
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.config.default_url);

        let base = Url::parse(&self.config.save_url)
            .map_err(|e| WorkerError::Config(format!("invalid save url: {}", e)))?;

        base.join(target)
            .map_err(|e| WorkerError::Window(format!("invalid target url {}: {}", target, e)))
    }

    pub async fn handle_click(&self, notification: &DisplayedNotification) -> ClickOutcome {
        if let Err(e) = self.display.close(notification).await {
            tracing::warn!(error = %e, tag = ?notification.tag, "Failed to close notification");
        }

        match self.navigate(notification).await {
            Ok(outcome) => {
                tracing::info!(?outcome, tag = ?notification.tag, "Notification click handled");
                outcome
            }
            Err(e) => {
                tracing::error!(error = %e, tag = ?notification.tag, "Notification click failed");
                ClickOutcome::Failed
            }
        }
    }

    async fn navigate(&self, notification: &DisplayedNotification) -> Result<ClickOutcome, WorkerError> {
        let target = self.resolve_target(notification)?;

        let windows = self.clients.match_all(true).await?;
        let existing = windows.iter().find(|window| {
            Url::parse(&window.url)
                .map(|url| same_route(&url, &target))
                .unwrap_or(false)
        });

        if let Some(window) = existing {
            let focused = self.clients.focus(&window.id).await?;
            return Ok(ClickOutcome::Focused(focused.id));
        }

        match self.clients.open_window(target.as_str()).await? {
            Some(_) => Ok(ClickOutcome::Opened(target.to_string())),
            None => Err(WorkerError::Window(format!(
                "platform refused to open {}",
                target
            ))),
        }
    }
}
