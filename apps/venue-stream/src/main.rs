//! Venue Stream Binary
//!
//! Starts the HTTP trigger server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin venue-stream
//! curl "http://127.0.0.1:8080/?location=NYC&categories=restaurants&rating=4.5"
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `YELP_API_KEY`: Yelp Fusion API key
//!
//! ## Optional
//! - `YELP_API_BASE_URL`: Search API base URL (default: <https://api.yelp.com/v3>)
//! - `YELP_TIMEOUT_SECS`: Search request timeout (default: 10)
//! - `YELP_SEARCH_LIMIT`: Results requested per search, 1-50 (default: 50)
//! - `VENUE_STREAM_HOST`: Listen address (default: 127.0.0.1)
//! - `VENUE_STREAM_PORT`: Listen port (default: 8080)
//! - `VENUE_STREAM_OBSERVERS`: Console observer labels, comma separated
//! - `OTEL_ENABLED`: Enable OpenTelemetry (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4318>)
//! - `OTEL_SERVICE_NAME`: Service name (default: venue-stream)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use venue_stream::infrastructure::telemetry;
use venue_stream::{
    AppState, ConsoleObserverFactory, HttpServer, PipelineRegistry, VenueStreamConfig, YelpClient,
    init_metrics,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // Initialize telemetry (tracing + optional OTLP export)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting Venue Stream");

    // Initialize Prometheus metrics
    let _metrics_handle = init_metrics();

    let config = VenueStreamConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let search = Arc::new(
        YelpClient::new(&config.credentials, &config.yelp)
            .context("failed to build search client")?,
    );
    let observers = Arc::new(ConsoleObserverFactory::from(config.observers.clone()));
    let registry = Arc::new(PipelineRegistry::new());

    let state = Arc::new(AppState::new(
        env!("CARGO_PKG_VERSION"),
        search,
        observers,
        Arc::clone(&registry),
    ));

    let shutdown_token = CancellationToken::new();
    let server = HttpServer::new(config.server.socket_addr(), state, shutdown_token.clone());
    let mut server_task = tokio::spawn(server.run());

    tracing::info!("Venue stream ready");

    tokio::select! {
        () = await_shutdown() => {}
        result = &mut server_task => {
            registry.release_all();
            return match result {
                Ok(result) => result.context("HTTP server failed"),
                Err(e) => Err(e).context("HTTP server task panicked"),
            };
        }
    }

    shutdown_token.cancel();
    let released = registry.release_all();

    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "HTTP server error during shutdown"),
        Err(e) => tracing::error!(error = %e, "HTTP server task panicked"),
    }

    tracing::info!(subscriptions = released, "Venue stream stopped");
    Ok(())
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Log the parsed configuration.
fn log_config(config: &VenueStreamConfig) {
    tracing::info!(
        addr = %config.server.socket_addr(),
        search_limit = config.yelp.search_limit,
        timeout_secs = config.yelp.timeout.as_secs(),
        observers = config.observers.labels.len(),
        "Configuration loaded"
    );
    tracing::debug!(base_url = %config.yelp.base_url, "Search endpoint");
}

/// Load .env file from any ancestor directory.
fn load_dotenv_from_ancestors() {
    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
