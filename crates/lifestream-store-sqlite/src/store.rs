//! [`SqliteStore`]: the SQLite implementation of [`RecordStore`] and
//! [`EventStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use lifestream_core::{
  NewRecord, Record, SourceKind,
  source::EventType,
  store::{EventQuery, EventStore, RecordStore, SortOrder},
};

use crate::{
  Error, Result,
  encode::{RawRecord, encode_canonical, encode_dt, table_layout},
  schema::SCHEMA,
};

/// Page size used by [`EventStore::list_events`] when the query sets none.
const DEFAULT_LIMIT: usize = 100;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A lifestream store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of rows currently stored for `source`.
  pub async fn count(&self, source: SourceKind) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", table_layout(source).table);
    let count: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [], |row| row.get(0))?))
      .await?;
    Ok(count as usize)
  }

  async fn query_one(&self, sql: String, param: rusqlite::types::Value) -> Result<Option<Record>> {
    let raw: Option<RawRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&sql, rusqlite::params![param], RawRecord::from_row).optional()?)
      })
      .await?;

    raw.map(RawRecord::into_record).transpose()
  }
}

/// Fail unless exactly one row was written.
fn expect_one(actual: usize) -> Result<()> {
  if actual == 1 { Ok(()) } else { Err(Error::RowCount { expected: 1, actual }) }
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn find_by_key(&self, source: SourceKind, key: &str) -> Result<Option<Record>> {
    let layout = table_layout(source);
    let sql = format!("{} WHERE {} = ?1", layout.select(source), layout.key_column);
    self.query_one(sql, key.to_owned().into()).await
  }

  async fn insert(&self, source: SourceKind, input: NewRecord) -> Result<Record> {
    let layout = table_layout(source);
    let created_at = Utc::now();

    let mut columns: Vec<&'static str> = vec![layout.key_column];
    let mut values: Vec<Option<String>> = vec![Some(input.key.clone())];
    if layout.has_kind {
      columns.push("type");
      values.push(input.kind.clone());
    }
    if layout.has_permalink {
      columns.push("permalink");
      values.push(input.permalink.clone());
    }
    columns.extend(["datetime", "metadata", "created_at"]);
    values.extend([
      Some(encode_canonical(&input.datetime)),
      Some(input.metadata.clone()),
      Some(encode_dt(created_at)),
    ]);

    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
      "INSERT INTO {} ({}) VALUES ({})",
      layout.table,
      columns.join(", "),
      placeholders.join(", "),
    );

    let (affected, id) = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(&sql, rusqlite::params_from_iter(values))?;
        Ok((affected, conn.last_insert_rowid()))
      })
      .await?;
    expect_one(affected)?;

    // Key-equal kinds (blogs) read their permalink back from the key column.
    let permalink = if layout.key_column == "permalink" {
      Some(input.key.clone())
    } else if layout.has_permalink {
      input.permalink
    } else {
      None
    };

    Ok(Record {
      id,
      source,
      key: input.key,
      kind: if layout.has_kind { input.kind } else { None },
      permalink,
      datetime: input.datetime,
      metadata: input.metadata,
      created_at,
      updated_at: None,
    })
  }

  async fn update_metadata(&self, source: SourceKind, key: &str, metadata: String) -> Result<()> {
    if !source.is_mutable() {
      return Err(Error::Immutable(source));
    }

    let layout = table_layout(source);
    let sql = format!(
      "UPDATE {} SET metadata = ?1, updated_at = ?2 WHERE {} = ?3",
      layout.table, layout.key_column,
    );
    let key = key.to_owned();
    let at_str = encode_dt(Utc::now());

    let affected = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![metadata, at_str, key])?))
      .await?;
    expect_one(affected)
  }
}

// ─── EventStore impl ─────────────────────────────────────────────────────────

impl EventStore for SqliteStore {
  type Error = Error;

  async fn list_events(&self, query: &EventQuery) -> Result<Vec<Record>> {
    let sources: Vec<SourceKind> = match query.source {
      Some(source) => vec![source],
      None => SourceKind::all().collect(),
    };
    let union = sources
      .into_iter()
      .map(|source| table_layout(source).select(source))
      .collect::<Vec<_>>()
      .join("\nUNION ALL\n");

    let direction = match query.order {
      SortOrder::Asc => "ASC",
      SortOrder::Desc => "DESC",
    };
    let sql = format!(
      "SELECT * FROM ({union})
       ORDER BY datetime {direction}, id {direction}
       LIMIT ?1 OFFSET ?2"
    );
    // SQLite binds i64; anything larger means "no bound".
    let limit_val = i64::try_from(query.limit.unwrap_or(DEFAULT_LIMIT)).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn get_event(&self, source: SourceKind, id: i64) -> Result<Option<Record>> {
    let sql = format!("{} WHERE id = ?1", table_layout(source).select(source));
    self.query_one(sql, id.into()).await
  }

  async fn list_types(&self) -> Result<Vec<EventType>> {
    let types = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, name FROM event_type ORDER BY id")?;
        let rows = stmt
          .query_map([], |row| Ok(EventType { id: row.get(0)?, name: row.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(types)
  }
}
