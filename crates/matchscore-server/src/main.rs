//! matchscore server
//!
//! Serves a trained match outcome classifier over HTTP.

use anyhow::Result;
use clap::Parser;
use matchscore_server::{
    cli::Cli,
    create_router,
    telemetry::{init_metrics, init_tracing},
    AppState, ServerConfig,
};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting matchscore server");

    let config = ServerConfig::load(&cli.config, &cli)?;
    let paths = config.artifact_paths();
    info!("Configuration loaded");
    info!("Model path: {}", paths.model.display());
    info!("Features path: {}", paths.features.display());

    let metrics_handle = init_metrics()?;

    let addr = config.socket_addr()?;
    let state = AppState::new(config, metrics_handle);
    if state.artifacts.ready().is_err() {
        warn!("Artifacts incomplete; /score will answer 500 until the service is restarted with valid artifacts");
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
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

    warn!("Shutdown signal received, stopping server...");
}
