//! Photo media from a photo-sharing API, paged backwards with `max_id`.
//!
//! The only mutable source: like and comment counts keep changing after a
//! photo is first stored, so every observation of a stored photo is checked
//! against the stored snapshot.

use lifestream_core::{Engagement, Record, SourceKind, zone::parse_unix};
use serde::Deserialize;
use serde_json::value::RawValue;
use tracing::warn;

use super::{Cursor, Page, Pagination, RawItem, Source, decode, endpoint, get_ok, id_string};
use crate::{
  error::FetchError,
  http::{HttpClient, HttpRequest},
};

const KIND: SourceKind = SourceKind::Photo;

#[derive(Deserialize)]
struct MediaPage {
  #[serde(default)]
  data: Vec<Box<RawValue>>,
}

#[derive(Deserialize)]
struct Counter {
  #[serde(default)]
  count: u64,
}

/// The fields of a media object the adapter reads.
#[derive(Deserialize)]
struct Media {
  id:           serde_json::Value,
  created_time: serde_json::Value,
  likes:        Option<Counter>,
  comments:     Option<Counter>,
}

impl Media {
  fn engagement(&self) -> Engagement {
    Engagement {
      likes:    self.likes.as_ref().map_or(0, |c| c.count),
      comments: self.comments.as_ref().map_or(0, |c| c.count),
    }
  }
}

pub struct PhotoSource<C> {
  client:       C,
  url:          String,
  access_token: String,
}

impl<C: HttpClient> PhotoSource<C> {
  pub fn new(client: C, base_url: &str, access_token: impl Into<String>) -> Self {
    Self {
      client,
      url: endpoint(base_url, "users/self/media/recent"),
      access_token: access_token.into(),
    }
  }
}

fn to_item(raw: &RawValue) -> Result<RawItem, FetchError> {
  let media: Media = decode(KIND, raw.get())?;
  let key = id_string(&media.id).ok_or_else(|| FetchError::body(KIND, "media without id"))?;
  let created = id_string(&media.created_time)
    .ok_or_else(|| FetchError::body(KIND, format!("media {key} has no created_time")))?;
  let published = parse_unix(&created).map_err(|e| FetchError::body(KIND, e))?;

  let mut item = RawItem::new(key, published, raw.get());
  item.engagement = Some(media.engagement());
  Ok(item)
}

/// Counts recorded in a stored photo's metadata.
pub fn stored_engagement(metadata: &str) -> Option<Engagement> {
  serde_json::from_str::<Media>(metadata)
    .ok()
    .map(|m| m.engagement())
}

impl<C: HttpClient> Source for PhotoSource<C> {
  fn kind(&self) -> SourceKind { KIND }

  fn pagination(&self) -> Pagination { Pagination::UntilEmpty }

  async fn fetch(&mut self, cursor: &Cursor) -> Result<Page, FetchError> {
    let mut request = HttpRequest::get(&self.url).query("access_token", &self.access_token);
    if let Cursor::MaxId(max_id) = cursor {
      request = request.query("max_id", max_id);
    }
    let response = get_ok(&self.client, KIND, &request).await?;

    let body: MediaPage = decode(KIND, &response.body)?;
    let items = body
      .data
      .iter()
      .map(|raw| to_item(raw))
      .collect::<Result<Vec<_>, _>>()?;

    let next = items.last().map(|last| Cursor::MaxId(last.key.clone()));
    Ok(Page { items, next })
  }

  fn needs_update(&self, stored: &Record, observed: &RawItem) -> bool {
    let Some(observed) = observed.engagement else {
      return false;
    };
    match stored_engagement(&stored.metadata) {
      Some(previous) => previous != observed,
      None => {
        warn!(key = %stored.key, "stored photo metadata has no readable counts; rewriting");
        true
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::http::stub::StubClient;

  fn media(id: &str, likes: u64, comments: u64) -> String {
    format!(
      r#"{{"id":"{id}","created_time":"1458423542","likes":{{"count":{likes}}},"comments":{{"count":{comments}}},"type":"image"}}"#
    )
  }

  fn stored(metadata: String) -> Record {
    Record {
      id: 1,
      source: KIND,
      key: "m1".into(),
      kind: None,
      permalink: None,
      datetime: Utc::now().naive_utc(),
      metadata,
      created_at: Utc::now(),
      updated_at: None,
    }
  }

  fn observed(likes: u64, comments: u64) -> RawItem {
    to_item(&RawValue::from_string(media("m1", likes, comments)).unwrap()).unwrap()
  }

  fn source() -> PhotoSource<StubClient> {
    PhotoSource::new(StubClient::new(), "https://api.example/v1", "tok")
  }

  #[tokio::test]
  async fn first_page_has_no_max_id_and_next_uses_last_item() {
    let client = StubClient::new();
    client.respond(200, format!(r#"{{"data":[{},{}]}}"#, media("m2", 0, 0), media("m1", 0, 0)));
    let mut source = PhotoSource::new(client.clone(), "https://api.example/v1", "tok");

    let page = source.fetch(&Cursor::Start).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.next, Some(Cursor::MaxId("m1".into())));

    let request = &client.requests()[0];
    assert_eq!(request.url, "https://api.example/v1/users/self/media/recent");
    assert_eq!(request.query_value("access_token"), Some("tok"));
    assert_eq!(request.query_value("max_id"), None);
  }

  #[tokio::test]
  async fn max_id_cursor_is_forwarded() {
    let client = StubClient::new();
    client.respond(200, r#"{"data":[]}"#);
    let mut source = PhotoSource::new(client.clone(), "https://api.example/v1", "tok");

    let page = source.fetch(&Cursor::MaxId("m1".into())).await.unwrap();
    assert!(page.items.is_empty());
    assert!(page.next.is_none());
    assert_eq!(client.requests()[0].query_value("max_id"), Some("m1"));
  }

  #[test]
  fn engagement_and_unix_time_are_read() {
    let item = observed(5, 2);
    assert_eq!(item.engagement, Some(Engagement { likes: 5, comments: 2 }));
    assert_eq!(item.published.timestamp(), 1458423542);
  }

  #[test]
  fn numeric_created_time_is_accepted() {
    let raw = RawValue::from_string(r#"{"id":"m9","created_time":1458423542}"#.to_owned()).unwrap();
    let item = to_item(&raw).unwrap();
    assert_eq!(item.engagement, Some(Engagement::default()));
  }

  #[test]
  fn changed_likes_need_update() {
    assert!(source().needs_update(&stored(media("m1", 1, 1)), &observed(2, 1)));
  }

  #[test]
  fn changed_comments_need_update() {
    assert!(source().needs_update(&stored(media("m1", 1, 1)), &observed(1, 3)));
  }

  #[test]
  fn unchanged_counts_do_not_need_update() {
    assert!(!source().needs_update(&stored(media("m1", 1, 1)), &observed(1, 1)));
  }

  #[test]
  fn unreadable_stored_counts_are_rewritten() {
    assert!(source().needs_update(&stored("not json".into()), &observed(1, 1)));
  }
}
