//! Ingest configuration.
//!
//! Read from an optional TOML file layered under `LIFESTREAM__*` environment
//! variables (e.g. `LIFESTREAM__PHOTO__ACCESS_TOKEN`). Every source section
//! is optional; a job fails with a configuration error when the section it
//! needs is missing or incomplete.

use std::path::{Path, PathBuf};

use lifestream_core::{CanonicalZone, SourceKind};
use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
  #[serde(default = "default_store_path")]
  pub store_path:   PathBuf,
  /// IANA name of the canonical zone.
  #[serde(default = "default_timezone")]
  pub timezone:     String,
  #[serde(default)]
  pub http:         HttpSettings,
  pub blog:         Option<FeedSettings>,
  pub blog_comment: Option<FeedSettings>,
  pub book:         Option<BookSettings>,
  pub code:         Option<CodeSettings>,
  pub distance:     Option<DistanceSettings>,
  pub photo:        Option<PhotoSettings>,
  pub video:        Option<VideoSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
  #[serde(default = "default_user_agent")]
  pub user_agent:   String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for HttpSettings {
  fn default() -> Self {
    Self { user_agent: default_user_agent(), timeout_secs: default_timeout_secs() }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
  pub feed_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookSettings {
  pub feed_url: String,
  #[serde(default = "default_shelf")]
  pub shelf:    String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeSettings {
  #[serde(default = "default_code_base_url")]
  pub base_url: String,
  pub username: String,
  pub token:    Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DistanceSettings {
  #[serde(default = "default_distance_base_url")]
  pub base_url: String,
  pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSettings {
  #[serde(default = "default_photo_base_url")]
  pub base_url:     String,
  pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoSettings {
  #[serde(default = "default_video_base_url")]
  pub base_url:    String,
  pub api_key:     String,
  pub playlist_id: String,
}

fn default_store_path() -> PathBuf { PathBuf::from("lifestream.db") }
fn default_timezone() -> String { "UTC".to_owned() }
fn default_user_agent() -> String { concat!("lifestream/", env!("CARGO_PKG_VERSION")).to_owned() }
fn default_timeout_secs() -> u64 { 30 }
fn default_shelf() -> String { "read".to_owned() }
fn default_code_base_url() -> String { "https://api.github.com".to_owned() }
fn default_distance_base_url() -> String { "https://api.dailymile.com".to_owned() }
fn default_photo_base_url() -> String { "https://api.instagram.com/v1".to_owned() }
fn default_video_base_url() -> String { "https://www.googleapis.com/youtube/v3".to_owned() }

// ─── Loading ─────────────────────────────────────────────────────────────────

impl IngestConfig {
  /// Load `path` (if it exists) and the `LIFESTREAM__*` environment.
  pub fn load(path: &Path) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("LIFESTREAM").separator("__"))
      .build()
      .map_err(|e| Error::configuration(format!("failed to read {}: {e}", path.display())))?;

    let mut cfg: Self = settings
      .try_deserialize()
      .map_err(|e| Error::configuration(e.to_string()))?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn zone(&self) -> Result<CanonicalZone> { Ok(CanonicalZone::new(&self.timezone)?) }

  /// Check everything the `kind` job needs before anything touches the
  /// network.
  pub fn validate_for(&self, kind: SourceKind) -> Result<()> {
    self.zone()?;
    match kind {
      SourceKind::Blog => require(kind, "feed_url", &self.blog()?.feed_url),
      SourceKind::BlogComment => require(kind, "feed_url", &self.blog_comment()?.feed_url),
      SourceKind::Book => {
        let book = self.book()?;
        require(kind, "feed_url", &book.feed_url)?;
        require(kind, "shelf", &book.shelf)
      }
      SourceKind::Code => {
        let code = self.code()?;
        require(kind, "base_url", &code.base_url)?;
        require(kind, "username", &code.username)
      }
      SourceKind::Distance => {
        let distance = self.distance()?;
        require(kind, "base_url", &distance.base_url)?;
        require(kind, "username", &distance.username)
      }
      SourceKind::Photo => {
        let photo = self.photo()?;
        require(kind, "base_url", &photo.base_url)?;
        require(kind, "access_token", &photo.access_token)
      }
      SourceKind::Video => {
        let video = self.video()?;
        require(kind, "base_url", &video.base_url)?;
        require(kind, "api_key", &video.api_key)?;
        require(kind, "playlist_id", &video.playlist_id)
      }
    }
  }

  pub fn blog(&self) -> Result<&FeedSettings> { section(SourceKind::Blog, self.blog.as_ref()) }

  pub fn blog_comment(&self) -> Result<&FeedSettings> {
    section(SourceKind::BlogComment, self.blog_comment.as_ref())
  }

  pub fn book(&self) -> Result<&BookSettings> { section(SourceKind::Book, self.book.as_ref()) }

  pub fn code(&self) -> Result<&CodeSettings> { section(SourceKind::Code, self.code.as_ref()) }

  pub fn distance(&self) -> Result<&DistanceSettings> {
    section(SourceKind::Distance, self.distance.as_ref())
  }

  pub fn photo(&self) -> Result<&PhotoSettings> { section(SourceKind::Photo, self.photo.as_ref()) }

  pub fn video(&self) -> Result<&VideoSettings> { section(SourceKind::Video, self.video.as_ref()) }
}

fn section<T>(kind: SourceKind, value: Option<&T>) -> Result<&T> {
  value.ok_or_else(|| Error::configuration(format!("missing [{}] section", table_name(kind))))
}

fn require(kind: SourceKind, field: &str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::configuration(format!("[{}] {field} must not be empty", table_name(kind))));
  }
  Ok(())
}

/// Config tables use snake_case where kinds use kebab-case.
fn table_name(kind: SourceKind) -> String { kind.name().replace('-', "_") }

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
