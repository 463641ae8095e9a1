//! Seams to the host platform: notification display, window clients and the
//! worker's own lifecycle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WorkerError;
use crate::payload::DisplayedNotification;

/// Shows and dismisses system notifications.
#[async_trait]
pub trait NotificationDisplay: Send + Sync {
    async fn show(&self, notification: &DisplayedNotification) -> Result<(), WorkerError>;

    async fn close(&self, notification: &DisplayedNotification) -> Result<(), WorkerError>;
}

/// An application window as the platform reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowClient {
    pub id: String,
    pub url: String,
    pub focused: bool,
    /// Whether this worker version controls the window.
    pub controlled: bool,
}

/// Access to the application's open windows.
#[async_trait]
pub trait WindowClients: Send + Sync {
    async fn match_all(&self, include_uncontrolled: bool) -> Result<Vec<WindowClient>, WorkerError>;

    async fn post_message(&self, client_id: &str, message: &WindowMessage) -> Result<(), WorkerError>;

    async fn focus(&self, client_id: &str) -> Result<WindowClient, WorkerError>;

    /// `None` when the platform refused to open a window.
    async fn open_window(&self, url: &str) -> Result<Option<WindowClient>, WorkerError>;
}

#[async_trait]
pub trait WorkerScope: Send + Sync {
    async fn skip_waiting(&self) -> Result<(), WorkerError>;
}

/// Minimal notification announced to open windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncedNotification {
    pub title: String,
    pub body: String,
    pub id: Option<String>,
}

/// Messages the worker posts to windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WindowMessage {
    NewNotification { notification: AnnouncedNotification },
}

/// Messages windows post to the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    SkipWaiting,
    ClientReady,
}
