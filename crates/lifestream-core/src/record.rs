//! Records: the persisted form of one upstream item.
//!
//! Every source kind stores the same envelope: a natural key assigned by the
//! upstream system, a timestamp already normalised into the canonical zone,
//! and the verbatim serialized item. A few kinds carry one or two extra
//! columns (`kind` for code and distance, `permalink` for books).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::SourceKind;

// ─── Insert payload ──────────────────────────────────────────────────────────

/// Everything the store needs to insert a row. `datetime` must already be in
/// the canonical zone; the store only encodes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
  pub key:       String,
  /// Upstream sub-type (code event type, workout activity type).
  pub kind:      Option<String>,
  pub permalink: Option<String>,
  pub datetime:  NaiveDateTime,
  pub metadata:  String,
}

// ─── Stored row ──────────────────────────────────────────────────────────────

/// A persisted row, as read back from any source table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
  /// Store-assigned id, unique within the source's table only.
  pub id:         i64,
  pub source:     SourceKind,
  pub key:        String,
  pub kind:       Option<String>,
  pub permalink:  Option<String>,
  pub datetime:   NaiveDateTime,
  pub metadata:   String,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
  /// Parse the stored metadata as JSON.
  pub fn metadata_json(&self) -> serde_json::Result<serde_json::Value> {
    serde_json::from_str(&self.metadata)
  }
}

// ─── Engagement ──────────────────────────────────────────────────────────────

/// Like and comment counters of a mutable item. Two snapshots that compare
/// equal mean the stored row is left untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
  pub likes:    u64,
  pub comments: u64,
}
