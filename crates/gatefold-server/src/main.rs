//! Gatefold server entry point.
//!
//! Bootstraps the upstream workspace client and starts the Axum HTTP
//! server with graceful shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use gatefold_server::config::ServerConfig;
use gatefold_server::state::AppState;
use gatefold_server::upstream::{WorkspaceClient, split};
use gatefold_server::app;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment.
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    if config.workspace.token.is_none() {
        info!("no workspace token configured, private attachments will not resolve");
    }

    let http = reqwest::Client::new();
    let (source, signer) = split(WorkspaceClient::new(
        http.clone(),
        config.workspace.clone(),
    ));

    let state = Arc::new(AppState {
        source,
        signer,
        http,
    });

    let router = app(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "gatefold server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("gatefold server stopped");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
}
