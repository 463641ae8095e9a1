//! FCM HTTP v1 client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::PushSender;
use crate::credentials::TokenSource;
use crate::error::PushError;
use crate::message::PushMessage;

const FCM_API_BASE: &str = "https://fcm.googleapis.com";

#[derive(Debug, Deserialize)]
struct SendResponse {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    details: Vec<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "errorCode")]
    error_code: Option<String>,
    #[serde(default, rename = "fieldViolations")]
    field_violations: Vec<FieldViolation>,
}

#[derive(Debug, Deserialize)]
struct FieldViolation {
    #[serde(default)]
    field: String,
}

impl ErrorBody {
    /// Whether an `INVALID_ARGUMENT` is about the registration token rather
    /// than some other part of the message.
    fn blames_token(&self) -> bool {
        let field_named = self
            .details
            .iter()
            .flat_map(|d| &d.field_violations)
            .any(|v| v.field == "message.token");

        field_named || self.message.contains("registration token")
    }
}

/// Sends messages through `projects.messages.send`.
pub struct FcmClient {
    http: reqwest::Client,
    project_id: String,
    api_base: String,
    tokens: TokenSource,
}

impl FcmClient {
    pub fn new(project_id: impl Into<String>, tokens: TokenSource) -> Result<Self, PushError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            project_id: project_id.into(),
            api_base: FCM_API_BASE.to_string(),
            tokens,
        })
    }

    /// Point the client at a different API host (emulators, tests).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            self.api_base, self.project_id
        )
    }
}

#[async_trait]
impl PushSender for FcmClient {
    async fn send(&self, message: &PushMessage) -> Result<String, PushError> {
        let access_token = self.tokens.access_token(&self.http).await?;

        let response = self
            .http
            .post(self.send_url())
            .bearer_auth(access_token)
            .json(&json!({ "message": message }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let sent: SendResponse = response.json().await?;
            return Ok(sent.name);
        }

        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status.as_u16(), &body))
    }
}

/// Map an FCM error response onto a `PushError`.
///
/// The `errorCode` in the FCM-specific detail wins over the generic
/// canonical status, which in turn wins over the bare HTTP status.
pub fn classify_error(http_status: u16, body: &str) -> PushError {
    let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let error = envelope.error;
    let message = if error.message.is_empty() {
        format!("HTTP {}", http_status)
    } else {
        error.message.clone()
    };

    let code = error
        .details
        .iter()
        .find_map(|d| d.error_code.clone())
        .unwrap_or_else(|| error.status.clone());

    match code.as_str() {
        "UNREGISTERED" | "NOT_FOUND" => PushError::TokenNotRegistered(message),
        "INVALID_ARGUMENT" if error.blames_token() => PushError::InvalidToken(message),
        "SENDER_ID_MISMATCH" => PushError::InvalidToken(message),
        "QUOTA_EXCEEDED" | "RESOURCE_EXHAUSTED" => PushError::QuotaExceeded(message),
        "THIRD_PARTY_AUTH_ERROR" | "UNAUTHENTICATED" | "PERMISSION_DENIED" => {
            PushError::Authentication(message)
        }
        _ => match http_status {
            401 | 403 => PushError::Authentication(message),
            404 => PushError::TokenNotRegistered(message),
            429 => PushError::QuotaExceeded(message),
            _ => PushError::Other(message),
        },
    }
}
