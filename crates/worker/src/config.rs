use serde::Deserialize;

/// Configuration of the background delivery runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Absolute URL of the remote save endpoint
    pub save_url: String,

    /// SQLite URL of the local pending store (default: sqlite:herald-pending.db)
    pub queue_url: String,

    /// Session cookies (`name=value`) attached to every remote save
    pub session_cookies: Vec<String>,

    /// Title used when a push carries none (default: СВУП)
    pub default_title: String,

    /// Body used when a push carries none (default: Нове сповіщення)
    pub default_body: String,

    /// Route opened on click when the notification carries no URL
    pub default_url: String,

    /// Icon and badge shown with every notification
    pub icon: String,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let save_url = std::env::var("HERALD_SAVE_URL")
            .map_err(|_| anyhow::anyhow!("HERALD_SAVE_URL environment variable is required"))?;
        url::Url::parse(&save_url)
            .map_err(|e| anyhow::anyhow!("HERALD_SAVE_URL must be an absolute URL: {}", e))?;

        let session_cookies = std::env::var("HERALD_SESSION_COOKIES")
            .map(|raw| parse_cookie_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            save_url,
            queue_url: std::env::var("HERALD_QUEUE_URL")
                .unwrap_or_else(|_| "sqlite:herald-pending.db".to_string()),
            session_cookies,
            default_title: std::env::var("HERALD_DEFAULT_TITLE")
                .unwrap_or_else(|_| "СВУП".to_string()),
            default_body: std::env::var("HERALD_DEFAULT_BODY")
                .unwrap_or_else(|_| "Нове сповіщення".to_string()),
            default_url: std::env::var("HERALD_DEFAULT_URL")
                .unwrap_or_else(|_| "/notifications".to_string()),
            icon: std::env::var("HERALD_ICON").unwrap_or_else(|_| "/favicon.svg".to_string()),
        })
    }

    /// Defaults for everything except the save endpoint.
    pub fn with_save_url(save_url: impl Into<String>) -> Self {
        Self {
            save_url: save_url.into(),
            queue_url: "sqlite::memory:".to_string(),
            session_cookies: Vec::new(),
            default_title: "СВУП".to_string(),
            default_body: "Нове сповіщення".to_string(),
            default_url: "/notifications".to_string(),
            icon: "/favicon.svg".to_string(),
        }
    }
}

/// Split `a=1; b=2` into individual `name=value` pairs.
fn parse_cookie_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|pair| pair.contains('='))
        .map(str::to_string)
        .collect()
}
