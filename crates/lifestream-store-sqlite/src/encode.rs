//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns, plus the per-kind table layout.
//!
//! Canonical datetimes are stored in `DATETIME_FORMAT`; audit timestamps as
//! RFC 3339 strings.

use chrono::{DateTime, NaiveDateTime, Utc};
use lifestream_core::{
  Record, SourceKind,
  zone::{format_datetime, parse_datetime},
};

use crate::{Error, Result};

// ─── Table layout ────────────────────────────────────────────────────────────

/// Where a source kind lives and which optional columns its table carries.
#[derive(Debug, Clone, Copy)]
pub struct TableLayout {
  pub table:         &'static str,
  pub key_column:    &'static str,
  pub has_kind:      bool,
  pub has_permalink: bool,
}

pub fn table_layout(source: SourceKind) -> TableLayout {
  let (table, key_column, has_kind, has_permalink) = match source {
    SourceKind::Blog => ("blog", "permalink", false, false),
    SourceKind::BlogComment => ("blog_comment", "permalink", false, false),
    SourceKind::Book => ("book", "book_id", false, true),
    SourceKind::Code => ("code", "event_id", true, false),
    SourceKind::Distance => ("distance", "entry_id", true, false),
    SourceKind::Photo => ("photo", "media_id", false, false),
    SourceKind::Video => ("video", "video_id", false, false),
  };
  TableLayout { table, key_column, has_kind, has_permalink }
}

impl TableLayout {
  /// A `SELECT` yielding the uniform column order read by [`RawRecord`].
  ///
  /// Kinds without a `type` / `permalink` column select `NULL` in its place,
  /// so every table can take part in the same `UNION ALL`.
  pub fn select(&self, source: SourceKind) -> String {
    let kind = if self.has_kind { "type" } else { "NULL" };
    let permalink = if self.has_permalink || self.key_column == "permalink" {
      "permalink"
    } else {
      "NULL"
    };
    format!(
      "SELECT id, '{name}' AS source, {key} AS key, {kind} AS type, {permalink} AS permalink,
              datetime, metadata, created_at, updated_at
       FROM {table}",
      name = source.name(),
      key = self.key_column,
      table = self.table,
    )
  }
}

// ─── DateTime ────────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_canonical(dt: &NaiveDateTime) -> String { format_datetime(dt) }

pub fn decode_canonical(s: &str) -> Result<NaiveDateTime> { Ok(parse_datetime(s)?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from any source table via [`TableLayout::select`].
pub struct RawRecord {
  pub id:         i64,
  pub source:     String,
  pub key:        String,
  pub kind:       Option<String>,
  pub permalink:  Option<String>,
  pub datetime:   String,
  pub metadata:   String,
  pub created_at: String,
  pub updated_at: Option<String>,
}

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(RawRecord {
      id:         row.get(0)?,
      source:     row.get(1)?,
      key:        row.get(2)?,
      kind:       row.get(3)?,
      permalink:  row.get(4)?,
      datetime:   row.get(5)?,
      metadata:   row.get(6)?,
      created_at: row.get(7)?,
      updated_at: row.get(8)?,
    })
  }

  pub fn into_record(self) -> Result<Record> {
    Ok(Record {
      id:         self.id,
      source:     SourceKind::parse(&self.source)?,
      key:        self.key,
      kind:       self.kind,
      permalink:  self.permalink,
      datetime:   decode_canonical(&self.datetime)?,
      metadata:   self.metadata,
      created_at: decode_dt(&self.created_at)?,
      updated_at: self.updated_at.as_deref().map(decode_dt).transpose()?,
    })
  }
}
