//! Workout entries from a distance-tracking API, paginated by page number.

use lifestream_core::{SourceKind, zone::parse_rfc3339};
use serde::Deserialize;
use serde_json::value::RawValue;

use super::{Cursor, Page, Pagination, RawItem, Source, decode, endpoint, get_ok, id_string};
use crate::{
  error::FetchError,
  http::{HttpClient, HttpRequest},
};

const KIND: SourceKind = SourceKind::Distance;

#[derive(Deserialize)]
struct EntriesPage {
  #[serde(default)]
  entries: Vec<Box<RawValue>>,
}

#[derive(Deserialize)]
struct Entry {
  id:      serde_json::Value,
  at:      String,
  #[serde(default)]
  workout: Option<Workout>,
}

#[derive(Deserialize)]
struct Workout {
  activity_type: Option<String>,
}

pub struct DistanceSource<C> {
  client: C,
  url:    String,
}

impl<C: HttpClient> DistanceSource<C> {
  pub fn new(client: C, base_url: &str, username: &str) -> Self {
    Self { client, url: endpoint(base_url, &format!("people/{username}/entries.json")) }
  }
}

fn to_item(raw: &RawValue) -> Result<RawItem, FetchError> {
  let entry: Entry = decode(KIND, raw.get())?;
  let key = id_string(&entry.id).ok_or_else(|| FetchError::body(KIND, "entry without id"))?;
  let published = parse_rfc3339(&entry.at).map_err(|e| FetchError::body(KIND, e))?;

  let mut item = RawItem::new(key, published, raw.get());
  item.kind = entry.workout.and_then(|w| w.activity_type);
  Ok(item)
}

impl<C: HttpClient> Source for DistanceSource<C> {
  fn kind(&self) -> SourceKind { KIND }

  fn pagination(&self) -> Pagination { Pagination::UntilNoNovelty }

  async fn fetch(&mut self, cursor: &Cursor) -> Result<Page, FetchError> {
    let page = cursor.page_number();
    let request = HttpRequest::get(&self.url).query("page", page);
    let response = get_ok(&self.client, KIND, &request).await?;

    let body: EntriesPage = decode(KIND, &response.body)?;
    let items = body
      .entries
      .iter()
      .map(|raw| to_item(raw))
      .collect::<Result<Vec<_>, _>>()?;

    let next = (!items.is_empty()).then_some(Cursor::Page(page + 1));
    Ok(Page { items, next })
  }
}
