//! Books read from a reading-tracker shelf, exposed as paginated RSS.

use lifestream_core::{SourceKind, zone::parse_rfc2822};

use super::{Cursor, Page, Pagination, RawItem, Source, get_ok};
use crate::{
  error::FetchError,
  http::{HttpClient, HttpRequest},
  rss::{self, RssItem},
};

const KIND: SourceKind = SourceKind::Book;

pub struct BookSource<C> {
  client:   C,
  feed_url: String,
  shelf:    String,
}

impl<C: HttpClient> BookSource<C> {
  pub fn new(client: C, feed_url: impl Into<String>, shelf: impl Into<String>) -> Self {
    Self { client, feed_url: feed_url.into(), shelf: shelf.into() }
  }
}

fn to_item(item: &RssItem) -> Result<RawItem, FetchError> {
  let key = rss::first_of(item, &["book_id"])
    .ok_or_else(|| FetchError::body(KIND, "item without book_id"))?;
  // Books without a read date fall back to when they were shelved.
  let date = rss::first_of(item, &["user_read_at", "pubDate"])
    .ok_or_else(|| FetchError::body(KIND, format!("book {key} has no date")))?;
  let published = parse_rfc2822(date).map_err(|e| FetchError::body(KIND, e))?;
  let metadata = rss::to_metadata(item).map_err(|e| FetchError::body(KIND, e))?;

  let mut raw = RawItem::new(key, published, metadata);
  raw.permalink = rss::first_of(item, &["link"]).map(str::to_owned);
  Ok(raw)
}

impl<C: HttpClient> Source for BookSource<C> {
  fn kind(&self) -> SourceKind { KIND }

  fn pagination(&self) -> Pagination { Pagination::UntilNoNovelty }

  async fn fetch(&mut self, cursor: &Cursor) -> Result<Page, FetchError> {
    let page = cursor.page_number();
    let request = HttpRequest::get(&self.feed_url)
      .query("shelf", &self.shelf)
      .query("page", page);
    let response = get_ok(&self.client, KIND, &request).await?;

    let items = rss::parse_items(&response.body)
      .map_err(|e| FetchError::body(KIND, e))?
      .iter()
      .map(to_item)
      .collect::<Result<Vec<_>, _>>()?;

    let next = (!items.is_empty()).then_some(Cursor::Page(page + 1));
    Ok(Page { items, next })
  }
}
