//! Serve command
//!
//! Starts the HTTP gateway:
//! - GET  /health        - Health check
//! - POST /predict       - Manual metrics prediction
//! - POST /predict/by-id - Identifier lookup prediction
//! - POST /analyze       - CSV batch analysis

use crate::cli::ServeArgs;
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use wellnessz_gateway::{
    build_router, AppState, Authorizer, ClientSource, GatewayConfig, HttpEngine,
    RequestOrchestrator,
};

/// Run the HTTP server
pub async fn run(args: ServeArgs) -> Result<()> {
    info!(
        host = %args.host,
        port = args.port,
        version = env!("CARGO_PKG_VERSION"),
        "Starting WellnessZ gateway"
    );

    let config = GatewayConfig::from_env().context("Invalid gateway configuration")?;
    info!(
        data_mode = %config.data_mode,
        engine = %config.engine.endpoint,
        "Configuration loaded"
    );

    let source = ClientSource::from_config(&config).context("Failed to build client source")?;

    if args.preload_dataset {
        match &source {
            ClientSource::Dataset(cache) => match cache.warm().await {
                Ok(rows) => info!(rows, path = %cache.path().display(), "Dataset preloaded"),
                Err(e) => warn!(error = %e, "Dataset preload failed, will retry on first lookup"),
            },
            _ => warn!(data_mode = %config.data_mode, "--preload-dataset ignored outside CSV mode"),
        }
    }

    let engine = HttpEngine::new(config.engine.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create engine client: {}", e))?;

    let orchestrator = RequestOrchestrator::new(source, Arc::new(engine));
    let state = AppState::new(orchestrator, Authorizer::new(&config.api_secret));
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    info!("Listening on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /health        - Health check");
    info!("  POST /predict       - Manual metrics prediction");
    info!("  POST /predict/by-id - Identifier lookup ({})", config.data_mode);
    info!("  POST /analyze       - CSV batch analysis");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
