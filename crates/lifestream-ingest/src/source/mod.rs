//! Source adapters: one per upstream feed.
//!
//! Every adapter implements [`Source`]. The driver only sees pages of
//! [`RawItem`]s and an optional next [`Cursor`]; request shapes, body
//! formats, and cursor rules stay inside the adapter.
//!
//! | Kind | Module | Cursor | Pagination |
//! |------|--------|--------|------------|
//! | `blog`, `blog-comment` | [`feed`] | none | [`Pagination::Single`] |
//! | `book` | [`book`] | page number | [`Pagination::UntilNoNovelty`] |
//! | `code` | [`code`] | pager | [`Pagination::Pager`] |
//! | `distance` | [`distance`] | page number | [`Pagination::UntilNoNovelty`] |
//! | `photo` | [`photo`] | `max_id` | [`Pagination::UntilEmpty`] |
//! | `video` | [`video`] | none | [`Pagination::Single`] |

pub mod book;
pub mod code;
pub mod distance;
pub mod feed;
pub mod photo;
pub mod video;

use std::future::Future;

use chrono::{DateTime, FixedOffset};
use lifestream_core::{CanonicalZone, Engagement, NewRecord, Record, SourceKind};
use serde::de::DeserializeOwned;

use crate::{
  error::FetchError,
  http::{HttpClient, HttpRequest, HttpResponse},
};

pub use book::BookSource;
pub use code::CodeSource;
pub use distance::DistanceSource;
pub use feed::FeedSource;
pub use photo::PhotoSource;
pub use video::VideoSource;

// ─── Paging ──────────────────────────────────────────────────────────────────

/// Where the next fetch should start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
  Start,
  /// One-based page number.
  Page(u32),
  /// Return items older than this upstream id.
  MaxId(String),
}

impl Cursor {
  /// The page number this cursor denotes; `Start` is page 1.
  pub fn page_number(&self) -> u32 {
    match self {
      Cursor::Page(n) => *n,
      _ => 1,
    }
  }
}

/// When a source has been read far enough.
///
/// Applied on top of the adapter's own next cursor: a page without a next
/// cursor always ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
  /// One request per run.
  Single,
  /// Stop at the first page with no items.
  UntilEmpty,
  /// Stop at the first page that inserted nothing. An empty page inserts
  /// nothing too.
  UntilNoNovelty,
  /// Follow the upstream pager until it reports no next page.
  Pager,
}

/// One page of parsed items plus the cursor for the page after it.
#[derive(Debug, Default)]
pub struct Page {
  pub items: Vec<RawItem>,
  pub next:  Option<Cursor>,
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// One upstream item, parsed just enough to dedupe and persist it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawItem {
  pub key:        String,
  pub kind:       Option<String>,
  pub permalink:  Option<String>,
  /// The upstream timestamp, in whatever offset upstream used.
  pub published:  DateTime<FixedOffset>,
  /// Verbatim serialized item.
  pub metadata:   String,
  pub engagement: Option<Engagement>,
}

impl RawItem {
  pub fn new(key: impl Into<String>, published: DateTime<FixedOffset>, metadata: impl Into<String>) -> Self {
    Self {
      key: key.into(),
      kind: None,
      permalink: None,
      published,
      metadata: metadata.into(),
      engagement: None,
    }
  }

  /// Build the insert payload, normalising the timestamp into `zone`.
  pub fn to_record(&self, zone: &CanonicalZone) -> NewRecord {
    NewRecord {
      key:       self.key.clone(),
      kind:      self.kind.clone(),
      permalink: self.permalink.clone(),
      datetime:  zone.normalize(&self.published),
      metadata:  self.metadata.clone(),
    }
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A single upstream feed.
pub trait Source: Send + Sync {
  fn kind(&self) -> SourceKind;

  fn pagination(&self) -> Pagination;

  /// Fetch and parse the page at `cursor`.
  ///
  /// Any failure (transport, status, body) is returned as a [`FetchError`]
  /// and ends the run.
  fn fetch<'a>(
    &'a mut self,
    cursor: &'a Cursor,
  ) -> impl Future<Output = Result<Page, FetchError>> + Send + 'a;

  /// Whether an already-stored row should be rewritten from `observed`.
  /// Insert-only sources keep the default.
  fn needs_update(&self, _stored: &Record, _observed: &RawItem) -> bool { false }
}

// ─── Shared adapter helpers ──────────────────────────────────────────────────

/// Issue `request` and insist on a 2xx response.
pub(crate) async fn get_ok<C: HttpClient>(
  client: &C,
  kind: SourceKind,
  request: &HttpRequest,
) -> Result<HttpResponse, FetchError> {
  let response = client.get(request).await?;
  if !response.is_success() {
    return Err(FetchError::Status {
      kind,
      url: request.url.clone(),
      status: response.status,
    });
  }
  Ok(response)
}

/// Deserialize a JSON body, reporting failures against `kind`.
pub(crate) fn decode<T: DeserializeOwned>(kind: SourceKind, body: &str) -> Result<T, FetchError> {
  serde_json::from_str(body).map_err(|e| FetchError::body(kind, e))
}

/// Render an upstream id (string or number) as a natural key.
pub(crate) fn id_string(value: &serde_json::Value) -> Option<String> {
  match value {
    serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
    serde_json::Value::Number(n) => Some(n.to_string()),
    _ => None,
  }
}

/// Join a configured base URL and a path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
  format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn page_number_defaults_to_one() {
    assert_eq!(Cursor::Start.page_number(), 1);
    assert_eq!(Cursor::Page(4).page_number(), 4);
    assert_eq!(Cursor::MaxId("9".into()).page_number(), 1);
  }

  #[test]
  fn ids_render_without_quotes() {
    assert_eq!(id_string(&serde_json::json!(123)).as_deref(), Some("123"));
    assert_eq!(id_string(&serde_json::json!("abc")).as_deref(), Some("abc"));
    assert_eq!(id_string(&serde_json::json!("")), None);
    assert_eq!(id_string(&serde_json::json!(null)), None);
  }

  #[test]
  fn endpoint_joins_cleanly() {
    assert_eq!(endpoint("https://api.example/", "/users/x"), "https://api.example/users/x");
    assert_eq!(endpoint("https://api.example", "users/x"), "https://api.example/users/x");
  }

  #[test]
  fn to_record_normalises_into_zone() {
    let zone = CanonicalZone::new("America/Phoenix").unwrap();
    let published = DateTime::parse_from_rfc3339("2016-03-19T21:39:02Z").unwrap();
    let record = RawItem::new("k", published, "{}").to_record(&zone);
    assert_eq!(record.datetime.to_string(), "2016-03-19 14:39:02");
  }
}
