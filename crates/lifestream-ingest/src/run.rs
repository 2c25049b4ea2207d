//! One job run: a source, a store, and the canonical zone, driven to the end.

use lifestream_core::{CanonicalZone, SourceKind, store::RecordStore};
use strum::Display;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use crate::{
  config::IngestConfig,
  driver::{PageDriver, RunStats},
  error::Result,
  http::HttpClient,
  source::{BookSource, CodeSource, DistanceSource, FeedSource, PhotoSource, Source, VideoSource},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RunState {
  Idle,
  Fetching,
  Persisting,
  Done,
  Failed,
}

pub struct Run<'a, S, R> {
  source: S,
  store:  &'a R,
  zone:   CanonicalZone,
  state:  RunState,
}

impl<'a, S: Source, R: RecordStore> Run<'a, S, R> {
  pub fn new(source: S, store: &'a R, zone: CanonicalZone) -> Self {
    Self { source, store, zone, state: RunState::Idle }
  }

  pub fn state(&self) -> RunState { self.state }

  /// Drive the source until its pagination policy says stop.
  ///
  /// The first fetch or store error fails the run; nothing is retried.
  pub async fn execute(&mut self) -> Result<RunStats> {
    let kind = self.source.kind();
    let span = info_span!("run", %kind, run_id = %Uuid::new_v4());
    async move {
      info!("run started");
      let result = self.drive().await;
      match &result {
        Ok(stats) => {
          self.transition(RunState::Done);
          info!(
            pages = stats.pages,
            fetched = stats.fetched,
            inserted = stats.inserted,
            updated = stats.updated,
            unchanged = stats.unchanged,
            "run complete"
          );
        }
        Err(e) => {
          self.transition(RunState::Failed);
          error!(error = %e, "run failed");
        }
      }
      result
    }
    .instrument(span)
    .await
  }

  async fn drive(&mut self) -> Result<RunStats> {
    let mut driver = PageDriver::new(&mut self.source, self.store, self.zone);
    loop {
      step(&mut self.state, RunState::Fetching);
      let Some(page) = driver.fetch().await? else {
        break;
      };
      step(&mut self.state, RunState::Persisting);
      let outcome = driver.persist(page).await?;
      debug!(?outcome, "page persisted");
      if driver.cursor().is_none() {
        break;
      }
    }
    Ok(driver.stats())
  }

  fn transition(&mut self, next: RunState) { step(&mut self.state, next); }
}

fn step(state: &mut RunState, next: RunState) {
  debug!(from = %state, to = %next, "run state");
  *state = next;
}

/// Build the `kind` adapter from `config` and run it against `store`.
pub async fn run_job<C, R>(kind: SourceKind, config: &IngestConfig, client: C, store: &R) -> Result<RunStats>
where
  C: HttpClient,
  R: RecordStore,
{
  config.validate_for(kind)?;
  let zone = config.zone()?;
  match kind {
    SourceKind::Blog => {
      let source = FeedSource::blog(client, &config.blog()?.feed_url);
      Run::new(source, store, zone).execute().await
    }
    SourceKind::BlogComment => {
      let source = FeedSource::blog_comment(client, &config.blog_comment()?.feed_url);
      Run::new(source, store, zone).execute().await
    }
    SourceKind::Book => {
      let book = config.book()?;
      let source = BookSource::new(client, &book.feed_url, &book.shelf);
      Run::new(source, store, zone).execute().await
    }
    SourceKind::Code => {
      let code = config.code()?;
      let source = CodeSource::new(client, &code.base_url, &code.username, code.token.as_deref());
      Run::new(source, store, zone).execute().await
    }
    SourceKind::Distance => {
      let distance = config.distance()?;
      let source = DistanceSource::new(client, &distance.base_url, &distance.username);
      Run::new(source, store, zone).execute().await
    }
    SourceKind::Photo => {
      let photo = config.photo()?;
      let source = PhotoSource::new(client, &photo.base_url, &photo.access_token);
      Run::new(source, store, zone).execute().await
    }
    SourceKind::Video => {
      let video = config.video()?;
      let source = VideoSource::new(client, &video.base_url, &video.api_key, &video.playlist_id);
      Run::new(source, store, zone).execute().await
    }
  }
}
