use thiserror::Error;

/// Failures inside the background delivery runtime.
///
/// None of these ever escape an event entry point; they are logged there.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Remote save transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote save rejected with status {status}: {message}")]
    SaveRejected { status: u16, message: String },

    #[error("Local queue error: {0}")]
    Queue(#[from] sqlx::Error),

    #[error("Display error: {0}")]
    Display(String),

    #[error("Window error: {0}")]
    Window(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WorkerError {
    /// Whether the server refused the record itself, so sending it again
    /// cannot succeed. Timeouts and rate limits are worth retrying.
    pub fn is_permanent_rejection(&self) -> bool {
        match self {
            WorkerError::SaveRejected { status, .. } => {
                (400..500).contains(status) && *status != 408 && *status != 429
            }
            _ => false,
        }
    }
}
