//! Salon Booking API Service
//!
//! REST API for customers, staff, services and appointment booking

use anyhow::{Context, Result};
use salon_api::{cors_layer, create_router, storage, AppState, Config, LogFormat, StorageBackend};
use salon_core::Repositories;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration (and .env) first so the log format is known
    let config = Config::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "salon_api=debug,salon_core=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    info!("Starting Salon Booking API");
    info!("  API address: {}", config.api_address());
    info!("  Storage backend: {:?}", config.storage_backend);
    info!("  CORS origins: {:?}", config.cors_allowed_origins);

    // Initialize storage
    let repos = match config.storage_backend {
        StorageBackend::Redis => {
            info!("  Redis URL: {}", config.redis_url);
            let conn = storage::connect(&config.redis_url)
                .await
                .context("Failed to initialize storage")?;
            storage::redis_repositories(conn)
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on restart");
            Repositories::in_memory()
        }
    };

    let cors = cors_layer(&config)?;
    let app = create_router(AppState::new(repos), cors);

    // Bind and serve
    let addr = config.api_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    info!("Salon Booking API running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Salon Booking API stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Received shutdown signal");
}
