//! Client for the remote save endpoint.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use serde::Deserialize;
use url::Url;

use herald_common::types::{Notification, SaveNotificationRequest, SaveNotificationResponse};

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::payload::NotificationFields;

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Posts notifications to the server with the session cookies attached.
pub struct SaveClient {
    http: reqwest::Client,
    save_url: Url,
}

impl SaveClient {
    pub fn new(config: &WorkerConfig) -> Result<Self, WorkerError> {
        let save_url = Url::parse(&config.save_url)
            .map_err(|e| WorkerError::Config(format!("invalid save url: {}", e)))?;

        let jar = Jar::default();
        for cookie in &config.session_cookies {
            jar.add_cookie_str(cookie, &save_url);
        }

        let http = reqwest::Client::builder()
            .cookie_provider(Arc::new(jar))
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { http, save_url })
    }

    /// The body the server expects for one notification.
    ///
    /// The stored title is the message text; the display title is a fixed
    /// product name and is not worth keeping per row.
    pub fn request_body(fields: &NotificationFields) -> SaveNotificationRequest {
        SaveNotificationRequest {
            notification_title: Some(fields.body.clone()),
            fcm_message_id: fields.notification_id.clone(),
            username: fields.username.clone(),
            timestamp: Some(fields.timestamp.clone()),
        }
    }

    /// Save once. Any non-2xx status is a failure whatever the body says.
    ///
    /// A 2xx with an unreadable body still counts as saved; the row is
    /// returned only when the server echoed it back.
    pub async fn try_save_remote(
        &self,
        fields: &NotificationFields,
    ) -> Result<Option<Notification>, WorkerError> {
        let response = self
            .http
            .post(self.save_url.clone())
            .json(&Self::request_body(fields))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.error)
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

            return Err(WorkerError::SaveRejected {
                status: status.as_u16(),
                message,
            });
        }

        match response.json::<SaveNotificationResponse>().await {
            Ok(saved) => {
                tracing::debug!(
                    notification_id = ?fields.notification_id,
                    "Notification saved to server"
                );
                Ok(saved.notification)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Save accepted but response body unreadable");
                Ok(None)
            }
        }
    }
}
