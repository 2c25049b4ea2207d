//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDateTime;
use lifestream_core::{
  NewRecord, SourceKind,
  store::{EventQuery, EventStore, RecordStore, SortOrder},
  zone::{format_datetime, parse_datetime},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn at(s: &str) -> NaiveDateTime { parse_datetime(s).unwrap() }

fn record(key: &str, datetime: &str) -> NewRecord {
  NewRecord {
    key:       key.into(),
    kind:      None,
    permalink: None,
    datetime:  at(datetime),
    metadata:  format!("{{\"id\":\"{key}\"}}"),
  }
}

// ─── Lookup / insert ─────────────────────────────────────────────────────────

#[tokio::test]
async fn find_missing_key_returns_none() {
  let s = store().await;
  for source in SourceKind::all() {
    assert!(s.find_by_key(source, "nope").await.unwrap().is_none());
  }
}

#[tokio::test]
async fn insert_then_find_by_key() {
  let s = store().await;

  let inserted = s
    .insert(SourceKind::Video, record("dQw4w9WgXcQ", "2016-03-19 14:39:02"))
    .await
    .unwrap();
  assert_eq!(inserted.source, SourceKind::Video);
  assert!(inserted.id > 0);

  let found = s
    .find_by_key(SourceKind::Video, "dQw4w9WgXcQ")
    .await
    .unwrap()
    .expect("row");
  assert_eq!(found.id, inserted.id);
  assert_eq!(found.metadata, "{\"id\":\"dQw4w9WgXcQ\"}");
  assert_eq!(format_datetime(&found.datetime), "2016-03-19 14:39:02");
  assert!(found.updated_at.is_none());
}

#[tokio::test]
async fn keys_are_scoped_per_table() {
  let s = store().await;
  s.insert(SourceKind::Code, record("42", "2016-01-01 00:00:00"))
    .await
    .unwrap();

  assert!(s.find_by_key(SourceKind::Distance, "42").await.unwrap().is_none());
  assert!(s.find_by_key(SourceKind::Code, "42").await.unwrap().is_some());
}

#[tokio::test]
async fn optional_columns_round_trip() {
  let s = store().await;

  let mut code = record("3001", "2016-01-02 03:04:05");
  code.kind = Some("PushEvent".into());
  s.insert(SourceKind::Code, code).await.unwrap();

  let mut book = record("1234", "2016-01-02 03:04:05");
  book.permalink = Some("https://books.example/1234".into());
  s.insert(SourceKind::Book, book).await.unwrap();

  let code = s.find_by_key(SourceKind::Code, "3001").await.unwrap().unwrap();
  assert_eq!(code.kind.as_deref(), Some("PushEvent"));
  assert!(code.permalink.is_none());

  let book = s.find_by_key(SourceKind::Book, "1234").await.unwrap().unwrap();
  assert_eq!(book.permalink.as_deref(), Some("https://books.example/1234"));
  assert!(book.kind.is_none());

  let post = s
    .insert(SourceKind::Blog, record("https://blog.example/post", "2016-01-02 03:04:05"))
    .await
    .unwrap();
  assert_eq!(post.permalink.as_deref(), Some("https://blog.example/post"));
}

#[tokio::test]
async fn duplicate_key_is_a_constraint_violation() {
  let s = store().await;
  s.insert(SourceKind::Distance, record("7", "2016-01-01 00:00:00"))
    .await
    .unwrap();

  let err = s
    .insert(SourceKind::Distance, record("7", "2016-01-01 00:00:00"))
    .await
    .unwrap_err();
  assert!(err.is_constraint_violation(), "unexpected error: {err}");
  assert_eq!(s.count(SourceKind::Distance).await.unwrap(), 1);
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn photo_metadata_update_replaces_blob() {
  let s = store().await;
  s.insert(SourceKind::Photo, record("99_1", "2016-01-01 00:00:00"))
    .await
    .unwrap();

  s.update_metadata(SourceKind::Photo, "99_1", "{\"likes\":{\"count\":2}}".into())
    .await
    .unwrap();

  let photo = s.find_by_key(SourceKind::Photo, "99_1").await.unwrap().unwrap();
  assert_eq!(photo.metadata, "{\"likes\":{\"count\":2}}");
  assert!(photo.updated_at.is_some());
}

#[tokio::test]
async fn update_of_missing_key_reports_row_count() {
  let s = store().await;
  let err = s
    .update_metadata(SourceKind::Photo, "ghost", "{}".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::RowCount { expected: 1, actual: 0 }));
}

#[tokio::test]
async fn update_of_insert_only_kind_is_rejected() {
  let s = store().await;
  s.insert(SourceKind::Book, record("1", "2016-01-01 00:00:00"))
    .await
    .unwrap();

  let err = s
    .update_metadata(SourceKind::Book, "1", "{}".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Immutable(SourceKind::Book)));
}

// ─── Events ──────────────────────────────────────────────────────────────────

async fn seeded() -> SqliteStore {
  let s = store().await;
  s.insert(SourceKind::Blog, record("https://blog.example/a", "2016-01-01 10:00:00"))
    .await
    .unwrap();
  s.insert(SourceKind::Code, record("c1", "2016-01-03 10:00:00"))
    .await
    .unwrap();
  s.insert(SourceKind::Photo, record("p1", "2016-01-02 10:00:00"))
    .await
    .unwrap();
  s.insert(SourceKind::Code, record("c2", "2016-01-04 10:00:00"))
    .await
    .unwrap();
  s
}

fn keys(records: &[lifestream_core::Record]) -> Vec<&str> {
  records.iter().map(|r| r.key.as_str()).collect()
}

#[tokio::test]
async fn list_events_spans_tables_newest_first() {
  let s = seeded().await;
  let events = s.list_events(&EventQuery::default()).await.unwrap();
  assert_eq!(keys(&events), ["c2", "c1", "p1", "https://blog.example/a"]);
  assert_eq!(events[2].source, SourceKind::Photo);
}

#[tokio::test]
async fn list_events_filters_sorts_and_pages() {
  let s = seeded().await;

  let code_only = EventQuery {
    source: Some(SourceKind::Code),
    order: SortOrder::Asc,
    ..Default::default()
  };
  assert_eq!(keys(&s.list_events(&code_only).await.unwrap()), ["c1", "c2"]);

  let page = EventQuery {
    limit: Some(2),
    offset: Some(1),
    ..Default::default()
  };
  assert_eq!(keys(&s.list_events(&page).await.unwrap()), ["c1", "p1"]);
}

#[tokio::test]
async fn oversized_limit_and_offset_saturate() {
  let s = seeded().await;

  let past_the_end = EventQuery {
    offset: Some(usize::MAX),
    ..Default::default()
  };
  assert!(s.list_events(&past_the_end).await.unwrap().is_empty());

  let everything = EventQuery {
    limit: Some(usize::MAX),
    ..Default::default()
  };
  assert_eq!(s.list_events(&everything).await.unwrap().len(), 4);
}

#[tokio::test]
async fn get_event_by_table_id() {
  let s = seeded().await;
  let c1 = s.find_by_key(SourceKind::Code, "c1").await.unwrap().unwrap();

  let fetched = s.get_event(SourceKind::Code, c1.id).await.unwrap().unwrap();
  assert_eq!(fetched.key, "c1");

  assert!(s.get_event(SourceKind::Video, c1.id).await.unwrap().is_none());
}

#[tokio::test]
async fn event_types_are_seeded_once() {
  let s = store().await;
  let types = s.list_types().await.unwrap();
  let names: Vec<_> = types.iter().map(|t| t.name.as_str()).collect();
  let expected: Vec<_> = SourceKind::all().map(SourceKind::name).collect();
  assert_eq!(names, expected);
}

#[tokio::test]
async fn reopening_a_file_keeps_rows() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("lifestream.db");

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert(SourceKind::Video, record("v1", "2016-01-01 00:00:00"))
      .await
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  assert_eq!(s.count(SourceKind::Video).await.unwrap(), 1);
  assert_eq!(s.list_types().await.unwrap().len(), 7);
}
