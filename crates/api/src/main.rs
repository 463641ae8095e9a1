//! Herald API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use herald_common::config::AppConfig;
use herald_common::db::{create_pool, run_migrations};
use herald_notifier::{Messaging, ServiceAccount};

use herald_api::routes::create_router;
use herald_api::state::AppState;

/// Request bodies above this size are rejected.
const MAX_BODY_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "herald_api=debug,herald_engine=debug,herald_notifier=debug,tower_http=debug",
            )
        }))
        .init();

    tracing::info!("Starting Herald API server...");

    // Load configuration
    let config = AppConfig::from_env()?;
    let addr: SocketAddr = config
        .bind_addr
        .parse()
        .map_err(|_| anyhow::anyhow!("BIND_ADDR must be a socket address"))?;

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;
    run_migrations(&pool).await?;

    // The FCM client is only built on the first push
    let messaging = Arc::new(Messaging::new(ServiceAccount {
        project_id: config.firebase_project_id.clone(),
        client_email: config.firebase_client_email.clone(),
        private_key: config.firebase_private_key.clone(),
    }));
    if config.firebase_project_id.is_none() {
        tracing::warn!("FIREBASE_PROJECT_ID not set, webhook pushes will fail");
    }

    // Build application state
    let state = AppState::new(pool, config, messaging);

    // Build router
    let app = create_router(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received shutdown signal, stopping gracefully...");
        })
        .await?;

    Ok(())
}
