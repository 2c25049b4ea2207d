//! lifestream-api server binary.
//!
//! Reads `lifestream.toml` (or the path given with `--config`), opens the
//! SQLite store the ingest jobs write to, and serves the read API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::http::Request;
use clap::Parser;
use lifestream_api::{ServerConfig, api_router};
use lifestream_core::CanonicalZone;
use lifestream_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Lifestream read API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, env = "LIFESTREAM_CONFIG", default_value = "lifestream.toml")]
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.as_path()).required(false))
    .add_source(config::Environment::with_prefix("LIFESTREAM").separator("__"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let zone = CanonicalZone::new(&server_cfg.timezone)?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let app = api_router(Arc::new(store), zone, server_cfg.api.user.as_str()).layer(
    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
      tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
      )
    }),
  );
  let address = format!("{}:{}", server_cfg.api.host, server_cfg.api.port);

  tracing::info!(%address, "listening");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
