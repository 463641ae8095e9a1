//! FCM HTTP v1 message body.

use std::collections::BTreeMap;

use serde::Serialize;

/// A single push addressed to one registration token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushMessage {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<PushNotification>,
    /// String-only key/value pairs delivered to the background handler.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webpush: Option<WebpushConfig>,
}

/// Title and body the provider may render on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushNotification {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebpushConfig {
    pub fcm_options: WebpushFcmOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebpushFcmOptions {
    pub link: String,
}

impl PushMessage {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            notification: None,
            data: BTreeMap::new(),
            webpush: None,
        }
    }

    pub fn with_notification(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.notification = Some(PushNotification {
            title: title.into(),
            body: body.into(),
        });
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.webpush = Some(WebpushConfig {
            fcm_options: WebpushFcmOptions { link: link.into() },
        });
        self
    }
}
