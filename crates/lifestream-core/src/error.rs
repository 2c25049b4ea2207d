//! Error types for `lifestream-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown source kind: {0:?}")]
  UnknownSource(String),

  #[error("unknown time zone: {0:?}")]
  UnknownZone(String),

  #[error("unparseable timestamp {value:?}: {reason}")]
  Timestamp { value: String, reason: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub(crate) fn timestamp(value: &str, reason: impl std::fmt::Display) -> Self {
    Self::Timestamp { value: value.to_owned(), reason: reason.to_string() }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
