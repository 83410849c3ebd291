//! whatif server binary.
//!
//! Reads `whatif.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the JSON API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use whatif_api::{ApiConfig, AppState};
use whatif_server::{ServerConfig, load_generator, open_store};

#[derive(Parser)]
#[command(author, version, about = "whatif alternate-reality server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "whatif.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;

  let store = open_store(&server_cfg.store_path).await?;
  let generator = load_generator(server_cfg.templates_path.as_deref())?;

  let state = AppState::new(store, generator, ApiConfig {
    public_url: server_cfg.public_url.clone(),
  });
  let app = whatif_server::app(state);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for ctrl-c: {e}");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
