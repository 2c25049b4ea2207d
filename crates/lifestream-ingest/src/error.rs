//! Error types for `lifestream-ingest`.
//!
//! Every variant is fatal to the job run that raised it. "Already stored" is
//! not an error and never shows up here.

use lifestream_core::SourceKind;
use thiserror::Error;

/// An upstream feed could not be read.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("{kind} feed returned HTTP {status} for {url}")]
  Status { kind: SourceKind, url: String, status: u16 },

  #[error("request to {url} failed: {message}")]
  Transport { url: String, message: String },

  #[error("{kind} feed sent an unreadable body: {message}")]
  Body { kind: SourceKind, message: String },
}

impl FetchError {
  pub fn transport(url: &str, message: impl std::fmt::Display) -> Self {
    Self::Transport { url: url.to_owned(), message: message.to_string() }
  }

  pub fn body(kind: SourceKind, message: impl std::fmt::Display) -> Self {
    Self::Body { kind, message: message.to_string() }
  }

  /// The HTTP status, when the failure was a non-success response.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. } => Some(*status),
      _ => None,
    }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Fetch(#[from] FetchError),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("configuration error: {0}")]
  Configuration(String),

  #[error("core error: {0}")]
  Core(#[from] lifestream_core::Error),
}

impl Error {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn configuration(message: impl Into<String>) -> Self {
    Self::Configuration(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
