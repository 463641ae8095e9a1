use thiserror::Error;

/// Failures while delivering a message through FCM.
#[derive(Debug, Error)]
pub enum PushError {
    #[error("Missing Firebase Admin SDK credentials")]
    MissingCredentials,

    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    #[error("Invalid registration token: {0}")]
    InvalidToken(String),

    #[error("Registration token is not registered: {0}")]
    TokenNotRegistered(String),

    #[error("FCM quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("FCM authentication failed: {0}")]
    Authentication(String),

    #[error("FCM transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("FCM send failed: {0}")]
    Other(String),
}

impl PushError {
    /// Whether the target token should be forgotten.
    pub fn is_stale_token(&self) -> bool {
        matches!(
            self,
            PushError::InvalidToken(_) | PushError::TokenNotRegistered(_)
        )
    }
}
