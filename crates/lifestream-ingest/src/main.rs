//! lifestream-ingest binary.
//!
//! Runs one ingest job and exits. Meant to be scheduled externally, one
//! invocation per source:
//!
//! ```text
//! lifestream-ingest --job photo --config /etc/lifestream.toml
//! ```

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use lifestream_core::SourceKind;
use lifestream_ingest::{Error, IngestConfig, ReqwestClient, run_job};
use lifestream_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Fetch one lifestream source into the store")]
struct Cli {
  /// Source to ingest: blog, blog-comment, book, code, distance, photo, video.
  #[arg(short, long)]
  job: String,

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

  let kind = SourceKind::parse(&cli.job)
    .map_err(|_| Error::configuration(format!("unknown job {:?}", cli.job)))?;

  // Fail on bad configuration before any network activity.
  let cfg = IngestConfig::load(&cli.config)?;
  cfg.validate_for(kind)?;

  let client = ReqwestClient::new(&cfg.http)?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let stats = run_job(kind, &cfg, client, &store)
    .await
    .with_context(|| format!("{kind} job failed"))?;

  tracing::debug!(?stats, "exiting");
  Ok(())
}
