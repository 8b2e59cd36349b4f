//! Serve command - run the HTTP server.

use super::service_config;
use crate::EngineArgs;
use anyhow::{Context, Result};
use std::sync::Arc;
use txt2svg_server::api::{ApiServer, AppState, ServerConfig};

/// Run the serve command.
pub async fn run(host: &str, port: u16, engine: &EngineArgs) -> Result<()> {
    tracing::info!(host = %host, port = %port, "Starting txt2svg server");

    let config = service_config(engine);
    let renderer = tokio::task::spawn_blocking(move || config.build())
        .await
        .context("Renderer setup task failed")?
        .context("Failed to set up renderer")?;

    let server = ApiServer::new(
        ServerConfig::new(host, port),
        Arc::new(AppState::new(renderer)),
    );
    let listener = server.bind().await.context("Failed to bind")?;

    println!("txt2svg listening on http://{}:{}", host, port);
    println!();
    println!("Endpoints:");
    println!(
        "  GET  http://{}:{}/service?text=&font=&color=  - Render SVG",
        host, port
    );
    println!(
        "  GET  http://{}:{}/<path>                      - Static files from {}",
        host,
        port,
        engine.assets.display()
    );
    println!();
    println!("Press Ctrl+C to stop.");

    server
        .serve(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received");
        })
        .await
        .context("Server failed")?;

    Ok(())
}
