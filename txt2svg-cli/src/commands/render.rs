//! Render command - produce one SVG without a server.

use super::service_config;
use crate::EngineArgs;
use anyhow::{Context, Result};
use std::path::Path;
use txt2svg_core::request::RenderRequest;

/// Run the render command.
pub async fn run(
    text: &str,
    font: &str,
    color: &str,
    output: Option<&Path>,
    engine: &EngineArgs,
) -> Result<()> {
    let config = service_config(engine);
    let renderer = tokio::task::spawn_blocking(move || config.build())
        .await
        .context("Renderer setup task failed")?
        .context("Failed to set up renderer")?;

    let request = RenderRequest::from_parts(Some(text), Some(font), Some(color));
    let svg = renderer
        .render(&request)
        .await
        .with_context(|| format!("Failed to render '{}' in font '{}'", text, font))?;

    match output {
        Some(path) => {
            tokio::fs::write(path, svg.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = svg.len(), "Wrote SVG");
        }
        None => println!("{}", svg),
    }

    Ok(())
}
