//! Public activity events from a code-hosting API.
//!
//! The API pages with a `page` parameter and advertises further pages in an
//! RFC 8288 `Link` header. [`Pager`] owns that state; the driver only learns
//! whether another page exists.

use lifestream_core::{SourceKind, zone::parse_rfc3339};
use serde::Deserialize;
use serde_json::value::RawValue;

use super::{Cursor, Page, Pagination, RawItem, Source, decode, endpoint, get_ok, id_string};
use crate::{
  error::FetchError,
  http::{HttpClient, HttpRequest, HttpResponse},
};

const KIND: SourceKind = SourceKind::Code;

// ─── Pager ───────────────────────────────────────────────────────────────────

/// Walks a `Link: rel="next"` paginated endpoint one page at a time.
pub struct Pager<C> {
  client:   C,
  request:  HttpRequest,
  page:     u32,
  has_next: bool,
}

impl<C: HttpClient> Pager<C> {
  pub fn new(client: C, request: HttpRequest) -> Self {
    Self { client, request, page: 0, has_next: true }
  }

  /// Rewind to the first page.
  pub fn reset(&mut self) {
    self.page = 0;
    self.has_next = true;
  }

  pub fn has_next(&self) -> bool { self.has_next }

  /// The last page fetched; 0 before the first fetch.
  pub fn page(&self) -> u32 { self.page }

  /// Fetch the next page, or `None` once the upstream reported no more.
  pub async fn fetch_next(&mut self) -> Result<Option<HttpResponse>, FetchError> {
    if !self.has_next {
      return Ok(None);
    }
    let page = self.page + 1;
    let request = self.request.clone().query("page", page);
    let response = get_ok(&self.client, KIND, &request).await?;

    self.page = page;
    self.has_next = response.header("link").is_some_and(has_next_link);
    Ok(Some(response))
  }
}

/// Whether an RFC 8288 `Link` header value contains a `rel="next"` entry.
fn has_next_link(link: &str) -> bool {
  link.split(',').any(|entry| {
    entry
      .split(';')
      .skip(1)
      .any(|param| matches!(param.trim(), "rel=\"next\"" | "rel=next"))
  })
}

// ─── Source ──────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Event {
  id:         serde_json::Value,
  #[serde(rename = "type")]
  kind:       Option<String>,
  created_at: String,
}

pub struct CodeSource<C> {
  pager: Pager<C>,
}

impl<C: HttpClient> CodeSource<C> {
  pub fn new(client: C, base_url: &str, username: &str, token: Option<&str>) -> Self {
    let mut request = HttpRequest::get(endpoint(base_url, &format!("users/{username}/events")))
      .header("Accept", "application/vnd.github+json");
    if let Some(token) = token.filter(|t| !t.is_empty()) {
      request = request.header("Authorization", format!("Bearer {token}"));
    }
    Self { pager: Pager::new(client, request) }
  }
}

fn to_item(raw: &RawValue) -> Result<RawItem, FetchError> {
  let event: Event = decode(KIND, raw.get())?;
  let key = id_string(&event.id).ok_or_else(|| FetchError::body(KIND, "event without id"))?;
  let published = parse_rfc3339(&event.created_at).map_err(|e| FetchError::body(KIND, e))?;

  let mut item = RawItem::new(key, published, raw.get());
  item.kind = event.kind;
  Ok(item)
}

impl<C: HttpClient> Source for CodeSource<C> {
  fn kind(&self) -> SourceKind { KIND }

  fn pagination(&self) -> Pagination { Pagination::Pager }

  async fn fetch(&mut self, cursor: &Cursor) -> Result<Page, FetchError> {
    if *cursor == Cursor::Start {
      self.pager.reset();
    }
    let Some(response) = self.pager.fetch_next().await? else {
      return Ok(Page::default());
    };

    let events: Vec<Box<RawValue>> = decode(KIND, &response.body)?;
    let items = events
      .iter()
      .map(|raw| to_item(raw))
      .collect::<Result<Vec<_>, _>>()?;

    let next = self
      .pager
      .has_next()
      .then(|| Cursor::Page(self.pager.page() + 1));
    Ok(Page { items, next })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::stub::StubClient;

  const EVENTS: &str = r#"[
    {"id":"3001","type":"PushEvent","created_at":"2016-03-19T21:39:02Z","repo":{"name":"me/site"}},
    {"id":"3000","type":"WatchEvent","created_at":"2016-03-18T10:00:00Z"}
  ]"#;

  const NEXT: &str = r#"<https://api.example/users/me/events?page=2>; rel="next", <https://api.example/users/me/events?page=10>; rel="last""#;

  #[test]
  fn link_header_parsing() {
    assert!(has_next_link(NEXT));
    assert!(!has_next_link(r#"<https://api.example/x?page=1>; rel="prev""#));
    assert!(!has_next_link(""));
  }

  #[tokio::test]
  async fn follows_next_link_until_absent() {
    let client = StubClient::new();
    client
      .respond_with(HttpResponse::new(200, EVENTS).with_header("Link", NEXT))
      .respond(200, "[]");
    let mut source = CodeSource::new(client.clone(), "https://api.example", "me", None);

    let first = source.fetch(&Cursor::Start).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.next, Some(Cursor::Page(2)));

    let second = source.fetch(&Cursor::Page(2)).await.unwrap();
    assert!(second.items.is_empty());
    assert!(second.next.is_none());

    let pages: Vec<_> = client
      .requests()
      .iter()
      .map(|r| r.query_value("page").unwrap().to_owned())
      .collect();
    assert_eq!(pages, ["1", "2"]);
  }

  #[tokio::test]
  async fn events_keep_type_and_verbatim_json() {
    let client = StubClient::new();
    client.respond(200, EVENTS);
    let mut source = CodeSource::new(client, "https://api.example", "me", None);

    let page = source.fetch(&Cursor::Start).await.unwrap();
    let push = &page.items[0];
    assert_eq!(push.key, "3001");
    assert_eq!(push.kind.as_deref(), Some("PushEvent"));
    assert_eq!(
      push.metadata,
      r#"{"id":"3001","type":"PushEvent","created_at":"2016-03-19T21:39:02Z","repo":{"name":"me/site"}}"#
    );
  }

  #[tokio::test]
  async fn token_is_sent_as_bearer_header() {
    let client = StubClient::new();
    client.respond(200, "[]");
    let mut source = CodeSource::new(client.clone(), "https://api.example/", "me", Some("s3cret"));
    source.fetch(&Cursor::Start).await.unwrap();

    let request = &client.requests()[0];
    assert_eq!(request.url, "https://api.example/users/me/events");
    assert!(
      request
        .headers
        .contains(&("Authorization".to_owned(), "Bearer s3cret".to_owned()))
    );
  }

  #[tokio::test]
  async fn unauthorized_is_a_fetch_error() {
    let client = StubClient::new();
    client.respond(401, r#"{"message":"Bad credentials"}"#);
    let mut source = CodeSource::new(client, "https://api.example", "me", Some("bad"));

    let err = source.fetch(&Cursor::Start).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
  }
}
