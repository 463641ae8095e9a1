//! Service-account credentials and OAuth2 access tokens for the FCM API.
//!
//! Access tokens are minted with the JWT bearer grant: a short-lived RS256
//! assertion signed with the service account key is exchanged at the Google
//! token endpoint. The resulting token is cached until shortly before expiry.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::PushError;

pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion (Google caps this at one hour).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they actually expire.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Raw service account fields as read from configuration.
#[derive(Debug, Clone, Default)]
pub struct ServiceAccount {
    pub project_id: Option<String>,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
}

impl ServiceAccount {
    /// Validate that every field is present.
    pub fn validate(&self) -> Result<(&str, &str, &str), PushError> {
        match (&self.project_id, &self.client_email, &self.private_key) {
            (Some(project), Some(email), Some(key)) => Ok((project, email, key)),
            _ => Err(PushError::MissingCredentials),
        }
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: chrono::DateTime<Utc>,
}

/// Where the FCM client gets its bearer token from.
pub enum TokenSource {
    ServiceAccount(ServiceAccountAuth),
    /// Fixed token, for emulators and tests.
    Static(String),
}

impl TokenSource {
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, PushError> {
        match self {
            TokenSource::ServiceAccount(auth) => auth.access_token(http).await,
            TokenSource::Static(token) => Ok(token.clone()),
        }
    }
}

/// Mints and caches OAuth2 access tokens for a service account.
pub struct ServiceAccountAuth {
    client_email: String,
    key: EncodingKey,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(client_email: &str, private_key_pem: &str) -> Result<Self, PushError> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| PushError::Credentials(format!("Invalid private key: {}", e)))?;

        Ok(Self {
            client_email: client_email.to_string(),
            key,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            cached: Mutex::new(None),
        })
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Return a cached token, or mint a new one when missing or about to expire.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, PushError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref()
            && token.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > Utc::now()
        {
            return Ok(token.value.clone());
        }

        let assertion = self.sign_assertion()?;
        let response = http
            .post(&self.token_url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PushError::Authentication(format!(
                "Token exchange returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = token.expires_in, "Minted FCM access token");

        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Utc::now() + Duration::seconds(token.expires_in),
        });

        Ok(value)
    }

    fn sign_assertion(&self) -> Result<String, PushError> {
        let now = Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: FCM_SCOPE,
            aud: GOOGLE_TOKEN_URL,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| PushError::Credentials(format!("Failed to sign assertion: {}", e)))
    }
}
