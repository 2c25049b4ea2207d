//! Uploaded videos, read from a single playlist listing.

use lifestream_core::{SourceKind, zone::parse_rfc3339};
use serde::Deserialize;
use serde_json::value::RawValue;

use super::{Cursor, Page, Pagination, RawItem, Source, decode, endpoint, get_ok};
use crate::{
  error::FetchError,
  http::{HttpClient, HttpRequest},
};

const KIND: SourceKind = SourceKind::Video;

/// Upper bound the playlist endpoint accepts for one request.
const MAX_RESULTS: u32 = 50;

#[derive(Deserialize)]
struct PlaylistPage {
  #[serde(default)]
  items: Vec<Box<RawValue>>,
}

#[derive(Deserialize)]
struct PlaylistItem {
  snippet: Snippet,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
  published_at: String,
  resource_id:  ResourceId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
  video_id: Option<String>,
}

pub struct VideoSource<C> {
  client:      C,
  url:         String,
  api_key:     String,
  playlist_id: String,
}

impl<C: HttpClient> VideoSource<C> {
  pub fn new(
    client: C,
    base_url: &str,
    api_key: impl Into<String>,
    playlist_id: impl Into<String>,
  ) -> Self {
    Self {
      client,
      url: endpoint(base_url, "playlistItems"),
      api_key: api_key.into(),
      playlist_id: playlist_id.into(),
    }
  }
}

fn to_item(raw: &RawValue) -> Result<RawItem, FetchError> {
  let item: PlaylistItem = decode(KIND, raw.get())?;
  let key = item
    .snippet
    .resource_id
    .video_id
    .filter(|id| !id.trim().is_empty())
    .ok_or_else(|| FetchError::body(KIND, "playlist item without a video id"))?;
  let published = parse_rfc3339(&item.snippet.published_at).map_err(|e| FetchError::body(KIND, e))?;

  Ok(RawItem::new(key, published, raw.get()))
}

impl<C: HttpClient> Source for VideoSource<C> {
  fn kind(&self) -> SourceKind { KIND }

  fn pagination(&self) -> Pagination { Pagination::Single }

  async fn fetch(&mut self, _cursor: &Cursor) -> Result<Page, FetchError> {
    let request = HttpRequest::get(&self.url)
      .query("part", "snippet")
      .query("maxResults", MAX_RESULTS)
      .query("playlistId", &self.playlist_id)
      .query("key", &self.api_key);
    let response = get_ok(&self.client, KIND, &request).await?;

    let body: PlaylistPage = decode(KIND, &response.body)?;
    let items = body
      .items
      .iter()
      .map(|raw| to_item(raw))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Page { items, next: None })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::stub::StubClient;

  const PLAYLIST: &str = r#"{"items":[
    {"kind":"youtube#playlistItem","snippet":{"publishedAt":"2016-03-19T21:39:02.000Z","title":"Launch","resourceId":{"kind":"youtube#video","videoId":"dQw4w9WgXcQ"}}}
  ]}"#;

  #[tokio::test]
  async fn keys_on_video_id_and_sends_playlist_params() {
    let client = StubClient::new();
    client.respond(200, PLAYLIST);
    let mut source = VideoSource::new(client.clone(), "https://video.example/v3", "k3y", "UU123");

    let page = source.fetch(&Cursor::Start).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].key, "dQw4w9WgXcQ");
    assert_eq!(page.items[0].published.timestamp(), 1458423542);
    assert!(page.next.is_none());

    let request = &client.requests()[0];
    assert_eq!(request.url, "https://video.example/v3/playlistItems");
    assert_eq!(request.query_value("part"), Some("snippet"));
    assert_eq!(request.query_value("maxResults"), Some("50"));
    assert_eq!(request.query_value("playlistId"), Some("UU123"));
    assert_eq!(request.query_value("key"), Some("k3y"));
  }

  #[tokio::test]
  async fn item_without_video_id_is_rejected() {
    let client = StubClient::new();
    client.respond(
      200,
      r#"{"items":[{"snippet":{"publishedAt":"2016-03-19T21:39:02Z","resourceId":{}}}]}"#,
    );
    let mut source = VideoSource::new(client, "https://video.example/v3", "k", "p");

    let err = source.fetch(&Cursor::Start).await.unwrap_err();
    assert!(matches!(err, FetchError::Body { kind: SourceKind::Video, .. }));
  }

  #[tokio::test]
  async fn forbidden_is_a_fetch_error() {
    let client = StubClient::new();
    client.respond(403, r#"{"error":{"code":403}}"#);
    let mut source = VideoSource::new(client, "https://video.example/v3", "k", "p");

    assert_eq!(source.fetch(&Cursor::Start).await.unwrap_err().status(), Some(403));
  }
}
