//! Has this item been stored before, and what should happen to it now?

use lifestream_core::{Record, SourceKind, store::RecordStore};

use crate::source::{RawItem, Source};

/// Fetch the stored row for `key`, if any.
pub async fn lookup<R: RecordStore>(
  store: &R,
  kind: SourceKind,
  key: &str,
) -> Result<Option<Record>, R::Error> {
  store.find_by_key(kind, key).await
}

/// Whether a row for `key` is already stored.
pub async fn exists<R: RecordStore>(store: &R, kind: SourceKind, key: &str) -> Result<bool, R::Error> {
  Ok(lookup(store, kind, key).await?.is_some())
}

/// What the driver does with one fetched item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Insert,
  Update,
  Unchanged,
}

/// Decide an item's fate from its stored counterpart.
pub fn decide<S: Source>(source: &S, stored: Option<&Record>, observed: &RawItem) -> Decision {
  match stored {
    None => Decision::Insert,
    Some(stored) if source.needs_update(stored, observed) => Decision::Update,
    Some(_) => Decision::Unchanged,
  }
}
