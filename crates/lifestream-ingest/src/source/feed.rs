//! Blog posts and blog comments: one unpaginated RSS request each.

use lifestream_core::{SourceKind, zone::parse_rfc2822};

use super::{Cursor, Page, Pagination, RawItem, Source, get_ok};
use crate::{
  error::FetchError,
  http::{HttpClient, HttpRequest},
  rss::{self, RssItem},
};

/// An RSS feed read in a single request.
pub struct FeedSource<C> {
  client:     C,
  kind:       SourceKind,
  feed_url:   String,
  /// Elements tried, in order, for the natural key.
  key_fields: &'static [&'static str],
}

impl<C: HttpClient> FeedSource<C> {
  /// Blog posts, keyed by their `<link>`.
  pub fn blog(client: C, feed_url: impl Into<String>) -> Self {
    Self {
      client,
      kind: SourceKind::Blog,
      feed_url: feed_url.into(),
      key_fields: &["link", "guid"],
    }
  }

  /// Blog comments, keyed by the comment permalink in `<guid>`; `<link>`
  /// usually points at the parent post and is only a fallback.
  pub fn blog_comment(client: C, feed_url: impl Into<String>) -> Self {
    Self {
      client,
      kind: SourceKind::BlogComment,
      feed_url: feed_url.into(),
      key_fields: &["guid", "link"],
    }
  }

  fn to_item(&self, item: &RssItem) -> Result<RawItem, FetchError> {
    let key = rss::first_of(item, self.key_fields)
      .ok_or_else(|| FetchError::body(self.kind, "item without a permalink"))?;
    let date = rss::first_of(item, &["pubDate", "dc:date"])
      .ok_or_else(|| FetchError::body(self.kind, format!("item {key} has no pubDate")))?;
    let published = parse_rfc2822(date).map_err(|e| FetchError::body(self.kind, e))?;
    let metadata = rss::to_metadata(item).map_err(|e| FetchError::body(self.kind, e))?;

    Ok(RawItem::new(key, published, metadata))
  }
}

impl<C: HttpClient> Source for FeedSource<C> {
  fn kind(&self) -> SourceKind { self.kind }

  fn pagination(&self) -> Pagination { Pagination::Single }

  async fn fetch(&mut self, _cursor: &Cursor) -> Result<Page, FetchError> {
    let request = HttpRequest::get(&self.feed_url);
    let response = get_ok(&self.client, self.kind, &request).await?;

    let items = rss::parse_items(&response.body)
      .map_err(|e| FetchError::body(self.kind, e))?
      .iter()
      .map(|item| self.to_item(item))
      .collect::<Result<Vec<_>, _>>()?;

    Ok(Page { items, next: None })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::http::stub::StubClient;

  const POSTS: &str = r#"<rss version="2.0"><channel>
    <item>
      <title>Hello</title>
      <link>https://blog.example/hello</link>
      <guid>https://blog.example/?p=1</guid>
      <pubDate>Sat, 19 Mar 2016 14:39:02 -0700</pubDate>
    </item>
  </channel></rss>"#;

  const COMMENTS: &str = r#"<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/"><channel>
    <item>
      <title>Re: Hello</title>
      <link>https://blog.example/hello</link>
      <guid>https://blog.example/hello#comment-3</guid>
      <dc:creator>Ann</dc:creator>
      <pubDate>Sun, 20 Mar 2016 09:00:00 +0000</pubDate>
    </item>
  </channel></rss>"#;

  #[tokio::test]
  async fn blog_posts_are_keyed_by_link() {
    let client = StubClient::new();
    client.respond(200, POSTS);
    let mut source = FeedSource::blog(client.clone(), "https://blog.example/rss.xml");

    let page = source.fetch(&Cursor::Start).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].key, "https://blog.example/hello");
    assert!(page.next.is_none());
    assert_eq!(client.requests()[0].url, "https://blog.example/rss.xml");
  }

  #[tokio::test]
  async fn comments_are_keyed_by_guid() {
    let client = StubClient::new();
    client.respond(200, COMMENTS);
    let mut source = FeedSource::blog_comment(client, "https://blog.example/comments.xml");

    let page = source.fetch(&Cursor::Start).await.unwrap();
    let item = &page.items[0];
    assert_eq!(item.key, "https://blog.example/hello#comment-3");
    assert_eq!(item.published.to_rfc3339(), "2016-03-20T09:00:00+00:00");
    let meta: serde_json::Value = serde_json::from_str(&item.metadata).unwrap();
    assert_eq!(meta["dc:creator"], "Ann");
  }

  #[tokio::test]
  async fn metadata_keeps_repeated_children_and_attributes() {
    let client = StubClient::new();
    client.respond(
      200,
      r#"<rss><channel><item>
        <link>https://blog.example/a</link>
        <category>rust</category>
        <category>cron</category>
        <enclosure url="https://blog.example/a.jpg" type="image/jpeg"/>
        <pubDate>Sat, 19 Mar 2016 14:39:02 -0700</pubDate>
      </item></channel></rss>"#,
    );
    let mut source = FeedSource::blog(client, "https://blog.example/rss.xml");

    let page = source.fetch(&Cursor::Start).await.unwrap();
    let meta: serde_json::Value = serde_json::from_str(&page.items[0].metadata).unwrap();
    assert_eq!(meta["category"], serde_json::json!(["rust", "cron"]));
    assert_eq!(meta["enclosure"]["@url"], "https://blog.example/a.jpg");
    assert_eq!(meta["enclosure"]["@type"], "image/jpeg");
  }

  #[tokio::test]
  async fn non_success_status_is_a_fetch_error() {
    let client = StubClient::new();
    client.respond(503, "down");
    let mut source = FeedSource::blog_comment(client, "https://blog.example/comments.xml");

    let err = source.fetch(&Cursor::Start).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
  }

  #[tokio::test]
  async fn malformed_body_is_a_fetch_error() {
    let client = StubClient::new();
    client.respond(200, "<html>oops</html>");
    let mut source = FeedSource::blog(client, "https://blog.example/rss.xml");

    let err = source.fetch(&Cursor::Start).await.unwrap_err();
    assert!(matches!(err, FetchError::Body { kind: SourceKind::Blog, .. }));
  }

  #[tokio::test]
  async fn item_without_date_is_rejected() {
    let client = StubClient::new();
    client.respond(
      200,
      "<rss><channel><item><link>https://blog.example/x</link></item></channel></rss>",
    );
    let mut source = FeedSource::blog(client, "https://blog.example/rss.xml");
    assert!(source.fetch(&Cursor::Start).await.is_err());
  }
}
