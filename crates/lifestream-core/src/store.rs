//! The `RecordStore` / `EventStore` traits and supporting query types.
//!
//! The traits are implemented by storage backends (e.g.
//! `lifestream-store-sqlite`). The ingest jobs depend on [`RecordStore`], the
//! read API on [`EventStore`]; neither depends on a concrete backend.

use std::future::Future;

use serde::Deserialize;

use crate::{
  record::{NewRecord, Record},
  source::{EventType, SourceKind},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Direction of the `datetime` ordering in [`EventStore::list_events`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

/// Parameters for [`EventStore::list_events`].
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  /// Restrict to a single source kind; `None` spans every table.
  pub source: Option<SourceKind>,
  pub order:  SortOrder,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Write side ──────────────────────────────────────────────────────────────

/// The narrow per-kind persistence contract the ingest jobs rely on.
///
/// Writes report success only when exactly one row was affected; anything
/// else (including a unique-key violation) is an error.
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up a row by its natural key. Absence is `Ok(None)`, never an error.
  fn find_by_key<'a>(
    &'a self,
    source: SourceKind,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + 'a;

  /// Insert a new row and return it as stored.
  fn insert(
    &self,
    source: SourceKind,
    record: NewRecord,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// Replace the metadata of an existing row.
  ///
  /// Only valid for kinds where [`SourceKind::is_mutable`] holds.
  fn update_metadata<'a>(
    &'a self,
    source: SourceKind,
    key: &'a str,
    metadata: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

// ─── Read side ───────────────────────────────────────────────────────────────

/// Read access used by the events API.
pub trait EventStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Rows across one or all source tables, ordered by `datetime`.
  fn list_events<'a>(
    &'a self,
    query: &'a EventQuery,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + 'a;

  /// A single row by its store id within `source`'s table.
  fn get_event(
    &self,
    source: SourceKind,
    id: i64,
  ) -> impl Future<Output = Result<Option<Record>, Self::Error>> + Send + '_;

  /// The seeded `event_type` reference rows.
  fn list_types(
    &self,
  ) -> impl Future<Output = Result<Vec<EventType>, Self::Error>> + Send + '_;
}
