use serde::Deserialize;

/// Global server configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Socket address the API server binds to (default: 0.0.0.0:3000)
    pub bind_addr: String,

    /// Secret used to validate the HS256 session token
    pub jwt_secret: String,

    /// Firebase project that owns the messaging sender
    pub firebase_project_id: Option<String>,

    /// Service account email used to mint FCM access tokens
    pub firebase_client_email: Option<String>,

    /// Service account private key (PEM)
    pub firebase_private_key: Option<String>,

    /// Route opened when a delivered push is clicked (default: /notifications)
    pub fcm_click_link: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            jwt_secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            firebase_project_id: non_empty_var("FIREBASE_PROJECT_ID"),
            firebase_client_email: non_empty_var("FIREBASE_CLIENT_EMAIL"),
            firebase_private_key: non_empty_var("FIREBASE_PRIVATE_KEY")
                .map(|key| unescape_private_key(&key)),
            fcm_click_link: std::env::var("FCM_CLICK_LINK")
                .unwrap_or_else(|_| "/notifications".to_string()),
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Private keys pasted into `.env` files usually carry literal `\n` sequences.
pub fn unescape_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}
