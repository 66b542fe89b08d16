//! Smart Scale Backend
//!
//! Turns smart-scale weight readings into body composition records.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Measurement pipeline, predictors, advice, simulator
//! - Repositories: CSV measurement history
//! - Shared crate: the body composition engine

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use smart_scale_backend::{config, routes, services::simulator, state::AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        history = %config.storage.csv_path.display(),
        "Starting Smart Scale Backend"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let mut state = AppState::new(config.clone())?;

    // Metrics are optional - the API works without a recorder
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Failed to install metrics recorder: {}. /metrics disabled.", e),
    }

    if let Err(e) = state.measurements().ensure_directory() {
        warn!("History directory unavailable: {:#}", e);
    }

    info!(
        device = config.scale.model.device_name(),
        characteristic = config.scale.model.measurement_characteristic(),
        "Expecting weight notifications"
    );

    let simulator = simulator::spawn(state.clone())
        .map_err(|e| anyhow::anyhow!("scale simulator: {}", e))?;

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = simulator {
        handle.abort();
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "smart_scale_backend=info,tower_http=info".into()
        } else {
            "smart_scale_backend=debug,tower_http=debug".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.scale.simulate {
        errors.push("The scale simulator must not run in production");
    }

    if config.advice.enabled
        && (config.advice.ollama_url.contains("localhost")
            || config.advice.ollama_url.contains("127.0.0.1"))
    {
        warn!("Advice URL points at localhost - ensure this is intentional for production");
    }

    if config.telemetry.enabled && config.telemetry.username.is_none() {
        warn!("Telemetry publishes without credentials - ensure the broker allows anonymous access");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
