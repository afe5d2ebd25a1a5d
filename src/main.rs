//! titrari-addon - Stremio subtitle addon for titrari.ro
//!
//! Searches titrari.ro by IMDb id, picks the right episode out of season
//! packs, and serves extracted, UTF-8 decoded subtitle text to Stremio.
//!
//! ```bash
//! titrari-addon                   # listen on :7000
//! PORT=8080 titrari-addon         # listen on :8080
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use titrari_addon::api::TitrariClient;
use titrari_addon::cli::Cli;
use titrari_addon::server;
use titrari_addon::service::SubtitleService;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("titrari_addon=info")),
        )
        .init();

    let cli = Cli::parse();
    let base_url = cli.effective_base_url();

    let service = Arc::new(SubtitleService::new(TitrariClient::new(), &base_url));
    let app = server::router(service, &base_url);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cli.port))
        .await
        .with_context(|| format!("failed to bind port {}", cli.port))?;

    info!(port = cli.port, base_url = %base_url, "addon listening");
    info!("install: stremio://{}/manifest.json", base_url.trim_start_matches("https://").trim_start_matches("http://"));

    axum::serve(listener, app).await?;
    Ok(())
}
