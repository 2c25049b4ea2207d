//! Walks a source page by page and persists what is new.
//!
//! The driver owns the cursor and the counters. It does not decide when a
//! run is over on its own; [`continuation`] combines the source's pagination
//! policy with what the last page did.

use lifestream_core::{CanonicalZone, store::RecordStore};
use tracing::{debug, error};

use crate::{
  error::{Error, Result},
  novelty::{self, Decision},
  source::{Cursor, Page, Pagination, RawItem, Source},
};

/// Totals for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
  pub pages:     usize,
  pub fetched:   usize,
  pub inserted:  usize,
  pub updated:   usize,
  pub unchanged: usize,
}

/// What persisting a single page did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageOutcome {
  pub fetched:   usize,
  pub inserted:  usize,
  pub updated:   usize,
  pub unchanged: usize,
}

impl RunStats {
  fn record(&mut self, outcome: &PageOutcome) {
    self.pages += 1;
    self.fetched += outcome.fetched;
    self.inserted += outcome.inserted;
    self.updated += outcome.updated;
    self.unchanged += outcome.unchanged;
  }
}

/// The cursor to fetch next, or `None` when the run is finished.
///
/// A page without a next cursor always ends the run.
pub fn continuation(policy: Pagination, outcome: &PageOutcome, next: Option<Cursor>) -> Option<Cursor> {
  let next = next?;
  match policy {
    Pagination::Single => None,
    Pagination::UntilEmpty if outcome.fetched == 0 => None,
    Pagination::UntilNoNovelty if outcome.inserted == 0 => None,
    Pagination::UntilEmpty | Pagination::UntilNoNovelty | Pagination::Pager => Some(next),
  }
}

pub struct PageDriver<'a, S, R> {
  source: &'a mut S,
  store:  &'a R,
  zone:   CanonicalZone,
  cursor: Option<Cursor>,
  stats:  RunStats,
}

impl<'a, S: Source, R: RecordStore> PageDriver<'a, S, R> {
  pub fn new(source: &'a mut S, store: &'a R, zone: CanonicalZone) -> Self {
    Self { source, store, zone, cursor: Some(Cursor::Start), stats: RunStats::default() }
  }

  pub fn cursor(&self) -> Option<&Cursor> { self.cursor.as_ref() }

  pub fn stats(&self) -> RunStats { self.stats }

  /// Fetch the page at the current cursor, or `None` once the run is over.
  pub async fn fetch(&mut self) -> Result<Option<Page>> {
    let Some(cursor) = self.cursor.as_ref() else {
      return Ok(None);
    };
    debug!(?cursor, "fetching page");
    let page = self.source.fetch(cursor).await?;
    Ok(Some(page))
  }

  /// Persist every item of `page` in order, then move the cursor on.
  ///
  /// The first store failure aborts the page; items before it stay written.
  pub async fn persist(&mut self, page: Page) -> Result<PageOutcome> {
    let mut outcome = PageOutcome { fetched: page.items.len(), ..Default::default() };
    for item in &page.items {
      match self.persist_item(item).await {
        Ok(Decision::Insert) => outcome.inserted += 1,
        Ok(Decision::Update) => outcome.updated += 1,
        Ok(Decision::Unchanged) => outcome.unchanged += 1,
        Err(e) => {
          error!(key = %item.key, error = %e, "failed to persist item");
          return Err(e);
        }
      }
    }

    self.stats.record(&outcome);
    self.cursor = continuation(self.source.pagination(), &outcome, page.next);
    Ok(outcome)
  }

  async fn persist_item(&self, item: &RawItem) -> Result<Decision> {
    let kind = self.source.kind();
    let stored = novelty::lookup(self.store, kind, &item.key)
      .await
      .map_err(Error::store)?;

    let decision = novelty::decide(&*self.source, stored.as_ref(), item);
    match decision {
      Decision::Insert => {
        self
          .store
          .insert(kind, item.to_record(&self.zone))
          .await
          .map_err(Error::store)?;
      }
      Decision::Update => {
        self
          .store
          .update_metadata(kind, &item.key, item.metadata.clone())
          .await
          .map_err(Error::store)?;
      }
      Decision::Unchanged => {}
    }
    debug!(key = %item.key, ?decision, "item persisted");
    Ok(decision)
  }
}
