//! Minimal RSS 2.0 item reader.
//!
//! Each `<item>` becomes a JSON object keyed by child element name (namespace
//! prefix kept, e.g. `dc:creator`). A plain child maps to its trimmed text.
//! A child with attributes maps to an object holding `@name` keys plus its
//! text under `#text`. Repeated children collect into an array in document
//! order. Nested markup inside a child is flattened into that child's text.
//! The object is also what gets stored as the item's raw metadata.

use quick_xml::{
  Reader,
  events::{BytesStart, Event},
};
use serde_json::{Map, Value};
use thiserror::Error;

/// One `<item>`: child element name → value.
pub type RssItem = Map<String, Value>;

/// Key under which an attributed element keeps its text.
pub const TEXT_KEY: &str = "#text";

#[derive(Debug, Error)]
#[error("malformed RSS: {0}")]
pub struct RssError(String);

/// A direct child of `<item>` being read.
struct Field {
  name:  String,
  attrs: Vec<(String, String)>,
  text:  String,
}

impl Field {
  fn open(e: &BytesStart<'_>) -> Result<Self, RssError> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
      let attr = attr.map_err(|e| RssError(e.to_string()))?;
      let value = attr.unescape_value().map_err(|e| RssError(e.to_string()))?;
      attrs.push((format!("@{}", element_name(attr.key.as_ref())?), value.into_owned()));
    }
    Ok(Self { name: element_name(e.name().as_ref())?, attrs, text: String::new() })
  }

  fn into_value(self) -> (String, Value) {
    if self.attrs.is_empty() {
      return (self.name, Value::String(self.text));
    }
    let mut object: Map<String, Value> = self
      .attrs
      .into_iter()
      .map(|(k, v)| (k, Value::String(v)))
      .collect();
    if !self.text.is_empty() {
      object.insert(TEXT_KEY.to_owned(), Value::String(self.text));
    }
    (self.name, Value::Object(object))
  }
}

/// Add `value` under `name`, turning a repeated name into an array.
fn append(item: &mut RssItem, name: String, value: Value) {
  match item.get_mut(&name) {
    None => {
      item.insert(name, value);
    }
    Some(Value::Array(values)) => values.push(value),
    Some(existing) => {
      let first = existing.take();
      *existing = Value::Array(vec![first, value]);
    }
  }
}

/// Parse every `<item>` of an RSS document, in document order.
///
/// A document without a `<channel>` (an HTML error page, an empty body) is
/// rejected rather than read as an empty feed.
pub fn parse_items(xml: &str) -> Result<Vec<RssItem>, RssError> {
  let mut reader = Reader::from_str(xml);
  reader.config_mut().trim_text(true);

  let mut saw_channel = false;
  let mut items = Vec::new();
  let mut current: Option<RssItem> = None;
  // Depth below the open <item>; 1 means "directly inside a child element".
  let mut depth = 0usize;
  let mut field: Option<Field> = None;

  loop {
    match reader.read_event().map_err(|e| RssError(e.to_string()))? {
      Event::Start(e) => {
        if current.is_none() {
          match e.local_name().as_ref() {
            b"channel" => saw_channel = true,
            b"item" => {
              current = Some(RssItem::new());
              depth = 0;
            }
            _ => {}
          }
          continue;
        }
        depth += 1;
        if depth == 1 {
          field = Some(Field::open(&e)?);
        }
      }
      Event::Empty(e) => {
        if let Some(item) = current.as_mut()
          && depth == 0
        {
          let (name, value) = Field::open(&e)?.into_value();
          append(item, name, value);
        }
      }
      Event::Text(t) => {
        if let Some(field) = field.as_mut() {
          let unescaped = t.unescape().map_err(|e| RssError(e.to_string()))?;
          push_text(&mut field.text, &unescaped);
        }
      }
      Event::CData(c) => {
        if let Some(field) = field.as_mut() {
          let bytes = c.into_inner();
          let raw = std::str::from_utf8(&bytes).map_err(|e| RssError(e.to_string()))?;
          push_text(&mut field.text, raw);
        }
      }
      Event::End(_) => {
        let Some(item) = current.as_mut() else { continue };
        if depth == 0 {
          items.extend(current.take());
          continue;
        }
        if depth == 1
          && let Some(done) = field.take()
        {
          let (name, value) = done.into_value();
          append(item, name, value);
        }
        depth -= 1;
      }
      Event::Eof => break,
      _ => {}
    }
  }

  if current.is_some() {
    return Err(RssError("unterminated <item>".into()));
  }
  if !saw_channel {
    return Err(RssError("no <channel> element".into()));
  }
  Ok(items)
}

/// Serialize an item as the JSON object stored in `metadata`.
pub fn to_metadata(item: &RssItem) -> serde_json::Result<String> { serde_json::to_string(item) }

/// The text of one element value: a string, or an attributed element's
/// `#text`. Repeated elements yield their first occurrence.
fn text_of(value: &Value) -> Option<&str> {
  match value {
    Value::String(s) => Some(s.as_str()),
    Value::Object(object) => object.get(TEXT_KEY).and_then(Value::as_str),
    Value::Array(values) => values.first().and_then(text_of),
    _ => None,
  }
}

/// The first non-blank text among `names`.
pub fn first_of<'a>(item: &'a RssItem, names: &[&str]) -> Option<&'a str> {
  names
    .iter()
    .filter_map(|n| item.get(*n).and_then(text_of))
    .map(str::trim)
    .find(|v| !v.is_empty())
}

fn element_name(raw: &[u8]) -> Result<String, RssError> {
  String::from_utf8(raw.to_vec()).map_err(|e| RssError(e.to_string()))
}

fn push_text(buf: &mut String, text: &str) {
  if !buf.is_empty() && !text.is_empty() {
    buf.push(' ');
  }
  buf.push_str(text.trim());
}
