//! Serve command - Starts the HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::jobs;
use crate::services::{JobQueueNotifier, LogNotifier, Notifier};

/// Execute the serve command
pub async fn execute(args: ServeArgs, mut config: Config) -> AppResult<()> {
    if let Some(host) = args.host {
        config.server_host = host;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }

    tracing::info!("Starting server...");

    // Connect and apply pending migrations
    let db = Arc::new(Database::connect(&config).await?);

    let cache = Arc::new(
        Cache::connect(&config)
            .await
            .map_err(|e| AppError::internal(format!("Failed to connect to Redis: {}", e)))?,
    );
    tracing::info!("Redis cache connected");

    let notifier = email_notifier(&config).await;

    let addr = config.server_addr();
    let app = create_router(AppState::from_config(db, cache, config, notifier));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    // Peer addresses feed the rate limiter when no proxy header is present
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Queue emails through apalis; without the queue, log them instead of failing requests.
async fn email_notifier(config: &Config) -> Arc<dyn Notifier> {
    match jobs::email_storage(config).await {
        Ok(storage) => {
            tracing::info!("Email queue ready");
            Arc::new(JobQueueNotifier::new(storage))
        }
        Err(e) => {
            tracing::warn!(error = ?e, "Email queue unavailable, notifications will only be logged");
            Arc::new(LogNotifier)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
