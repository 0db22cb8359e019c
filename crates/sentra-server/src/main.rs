//! Sentra Server
//!
//! Loads a fitted sentiment pipeline once and serves single and batch
//! scoring requests over HTTP.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::signal;
use tracing::{error, info, warn};

use sentra_server::{create_router, AppState, Cli, ServiceConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting Sentra sentiment service");

    // Load configuration
    let config = ServiceConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Model: {}", config.model_path.display());
    info!("Device: {}", config.device);
    info!("Labels: {:?}", config.labels);
    info!("Confidence policy: {:?}", config.confidence);

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // The model is loaded exactly once; nothing is served if this fails
    let state = match AppState::new(config, Some(metrics_handle)) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to load model, refusing to start: {}", e);
            return Err(e.into());
        }
    };
    info!("Model '{}' ready", state.model.name());

    let addr = state.config.bind_address()?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    // Graceful shutdown handler
    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
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
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("sentra=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sentra=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "sentra_requests_total",
        "Total number of scoring requests by endpoint"
    );
    metrics::describe_counter!(
        "sentra_texts_scored_total",
        "Total number of texts scored"
    );
    metrics::describe_counter!("sentra_errors_total", "Total number of errors by kind");
    metrics::describe_histogram!(
        "sentra_inference_latency_us",
        metrics::Unit::Microseconds,
        "Model inference latency in microseconds by endpoint"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
