//! Push payloads and the notifications built from them.
//!
//! The provider delivers a string-only `data` map and, sometimes, its own
//! `notification` block. Each displayed field is resolved by walking an
//! ordered list of candidate sources; the first non-blank value wins and the
//! configured default covers the rest.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::config::WorkerConfig;

/// Payload handed to the background handler by the push transport.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub notification: Option<ProviderNotification>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

/// Display block the provider attaches alongside `data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderNotification {
    pub title: Option<String>,
    pub body: Option<String>,
}

/// One place a field value may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Data(&'static str),
    ProviderTitle,
    ProviderBody,
}

pub const TITLE_SOURCES: &[FieldSource] = &[FieldSource::Data("title"), FieldSource::ProviderTitle];

pub const BODY_SOURCES: &[FieldSource] = &[
    FieldSource::Data("body"),
    FieldSource::Data("notificationBody"),
    FieldSource::ProviderBody,
];

pub const ID_SOURCES: &[FieldSource] = &[FieldSource::Data("notificationId")];
pub const USERNAME_SOURCES: &[FieldSource] = &[FieldSource::Data("username")];
pub const TIMESTAMP_SOURCES: &[FieldSource] = &[FieldSource::Data("timestamp")];
pub const URL_SOURCES: &[FieldSource] = &[FieldSource::Data("url")];

impl PushPayload {
    /// Build a payload from `data` pairs only.
    pub fn from_data<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            notification: None,
            data: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn lookup(&self, source: FieldSource) -> Option<&str> {
        let value = match source {
            FieldSource::Data(key) => self.data.get(key).map(String::as_str),
            FieldSource::ProviderTitle => self.notification.as_ref()?.title.as_deref(),
            FieldSource::ProviderBody => self.notification.as_ref()?.body.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// First non-blank value along `sources`.
    pub fn resolve(&self, sources: &[FieldSource]) -> Option<&str> {
        sources.iter().find_map(|source| self.lookup(*source))
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fields extracted from one payload, defaults applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationFields {
    pub title: String,
    pub body: String,
    pub notification_id: Option<String>,
    pub username: Option<String>,
    pub timestamp: String,
    pub url: Option<String>,
}

impl NotificationFields {
    pub fn extract(payload: &PushPayload, config: &WorkerConfig, now: DateTime<Utc>) -> Self {
        let owned = |sources: &[FieldSource]| payload.resolve(sources).map(str::to_string);

        Self {
            title: owned(TITLE_SOURCES).unwrap_or_else(|| config.default_title.clone()),
            body: owned(BODY_SOURCES).unwrap_or_else(|| config.default_body.clone()),
            notification_id: owned(ID_SOURCES),
            username: owned(USERNAME_SOURCES),
            timestamp: owned(TIMESTAMP_SOURCES).unwrap_or_else(|| iso_timestamp(now)),
            url: owned(URL_SOURCES),
        }
    }
}

/// Data bag attached to a displayed notification, read back on click.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub url: Option<String>,
    pub notification_id: Option<String>,
    pub body: String,
    pub timestamp: String,
}

/// A notification as handed to the platform for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayedNotification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    /// Notifications sharing a tag replace each other instead of stacking.
    pub tag: Option<String>,
    pub data: NotificationData,
}

impl DisplayedNotification {
    pub fn from_fields(fields: &NotificationFields, config: &WorkerConfig) -> Self {
        Self {
            title: fields.title.clone(),
            body: fields.body.clone(),
            icon: config.icon.clone(),
            badge: config.icon.clone(),
            tag: fields.notification_id.clone(),
            data: NotificationData {
                url: fields.url.clone(),
                notification_id: fields.notification_id.clone(),
                body: fields.body.clone(),
                timestamp: fields.timestamp.clone(),
            },
        }
    }
}
