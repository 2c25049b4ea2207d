//! Read-only JSON API over the lifestream store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`lifestream_core::store::EventStore`]. Every stored item is presented as
//! an "event" owned by the single configured user.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", lifestream_api::api_router(store.clone(), zone, "jacob"))
//! ```

pub mod describe;
pub mod error;
pub mod events;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use lifestream_core::{CanonicalZone, store::EventStore};
use serde::Deserialize;

pub use error::ApiError;

// ─── Configuration ───────────────────────────────────────────────────────────

/// The subset of `lifestream.toml` the server reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  #[serde(default = "default_timezone")]
  pub timezone:   String,
  #[serde(default)]
  pub api:        ApiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  /// Name reported as the `user` of every event.
  #[serde(default = "default_user")]
  pub user: String,
}

impl Default for ApiSettings {
  fn default() -> Self { Self { host: default_host(), port: default_port(), user: default_user() } }
}

fn default_store_path() -> PathBuf { PathBuf::from("lifestream.db") }
fn default_timezone() -> String { "UTC".to_owned() }
fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 5280 }
fn default_user() -> String { "me".to_owned() }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub zone:  CanonicalZone,
  pub user:  Arc<str>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), zone: self.zone, user: Arc::clone(&self.user) }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, zone: CanonicalZone, user: impl Into<Arc<str>>) -> Router<()>
where
  S: EventStore + 'static,
{
  let state = AppState { store, zone, user: user.into() };
  Router::new()
    .route("/events",             get(events::list::<S>))
    .route("/events/{type}/{id}", get(events::get_one::<S>))
    .route("/types",              get(events::types::<S>))
    .with_state(state)
}
