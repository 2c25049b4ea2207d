//! The closed set of upstream feeds the aggregator ingests.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::{Error, Result};

/// One upstream feed. Each kind owns exactly one table and one ingest job.
///
/// The kebab-case name doubles as the job selector, the `type` of an event in
/// the read API, and the row name in the `event_type` reference table.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SourceKind {
  Blog,
  BlogComment,
  Book,
  Code,
  Distance,
  Photo,
  Video,
}

impl SourceKind {
  /// Parse a selector, reporting unknown names as [`Error::UnknownSource`].
  pub fn parse(name: &str) -> Result<Self> {
    Self::from_str(name.trim()).map_err(|_| Error::UnknownSource(name.to_owned()))
  }

  /// All kinds, in declaration order.
  pub fn all() -> impl Iterator<Item = Self> { Self::iter() }

  pub fn name(self) -> &'static str { self.into() }

  /// Whether stored rows of this kind may be rewritten after insert.
  ///
  /// Only photo media carries counters (likes, comments) that change upstream
  /// after the item is first observed.
  pub fn is_mutable(self) -> bool { matches!(self, Self::Photo) }
}

/// A row of the `event_type` reference table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
  pub id:   i64,
  pub name: String,
}
