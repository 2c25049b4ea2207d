//! Error type for `lifestream-store-sqlite`.

use lifestream_core::SourceKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] lifestream_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A write touched some number of rows other than the one it targeted.
  #[error("expected {expected} row(s) affected, got {actual}")]
  RowCount { expected: usize, actual: usize },

  #[error("{0} records are insert-only")]
  Immutable(SourceKind),
}

impl Error {
  /// Whether this is a UNIQUE / NOT NULL / CHECK violation reported by SQLite,
  /// e.g. two concurrent runs racing to insert the same natural key.
  pub fn is_constraint_violation(&self) -> bool {
    matches!(
      self,
      Error::Database(tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _)))
        if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
