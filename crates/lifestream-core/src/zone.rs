//! The canonical time zone and the timestamp formats upstream feeds use.
//!
//! Upstream feeds report times in whatever zone and format they like. Before
//! a record is persisted its timestamp is converted into one process-wide
//! zone and stored as naive local time in [`DATETIME_FORMAT`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::{Error, Result};

/// Text format of every persisted `datetime` column.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The zone all persisted datetimes are normalised into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalZone(Tz);

impl CanonicalZone {
  /// Resolve an IANA zone name such as `America/Phoenix`.
  pub fn new(name: &str) -> Result<Self> {
    name
      .trim()
      .parse::<Tz>()
      .map(Self)
      .map_err(|_| Error::UnknownZone(name.to_owned()))
  }

  pub fn tz(&self) -> Tz { self.0 }

  /// Convert an instant into naive wall-clock time in this zone.
  pub fn normalize<Z: TimeZone>(&self, instant: &DateTime<Z>) -> NaiveDateTime {
    instant.with_timezone(&self.0).naive_local()
  }

  /// Re-attach this zone to a stored naive datetime.
  ///
  /// Ambiguous local times (DST fold) resolve to the earlier instant; times
  /// inside a DST gap are read as UTC.
  pub fn localize(&self, naive: &NaiveDateTime) -> DateTime<Tz> {
    self
      .0
      .from_local_datetime(naive)
      .earliest()
      .unwrap_or_else(|| self.0.from_utc_datetime(naive))
  }
}

impl Default for CanonicalZone {
  fn default() -> Self { Self(Tz::UTC) }
}

// ─── Upstream formats ────────────────────────────────────────────────────────

/// RSS `pubDate` style, e.g. `Sat, 19 Mar 2016 14:39:02 -0700`.
pub fn parse_rfc2822(value: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc2822(value.trim()).map_err(|e| Error::timestamp(value, e))
}

/// JSON API style, e.g. `2016-03-19T21:39:02Z`.
pub fn parse_rfc3339(value: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(value.trim()).map_err(|e| Error::timestamp(value, e))
}

/// Unix seconds, as a decimal string.
pub fn parse_unix(value: &str) -> Result<DateTime<FixedOffset>> {
  let secs: i64 = value.trim().parse().map_err(|e| Error::timestamp(value, e))?;
  DateTime::from_timestamp(secs, 0)
    .map(|dt| dt.fixed_offset())
    .ok_or_else(|| Error::timestamp(value, "out of range"))
}

/// Encode a canonical datetime for storage.
pub fn format_datetime(dt: &NaiveDateTime) -> String { dt.format(DATETIME_FORMAT).to_string() }

/// Decode a stored canonical datetime.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
  NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).map_err(|e| Error::timestamp(value, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn phoenix() -> CanonicalZone { CanonicalZone::new("America/Phoenix").unwrap() }

  #[test]
  fn unknown_zone_is_rejected() {
    assert!(matches!(CanonicalZone::new("Mars/Olympus"), Err(Error::UnknownZone(_))));
  }

  #[test]
  fn rfc2822_is_normalised_into_zone() {
    let dt = parse_rfc2822("Sat, 19 Mar 2016 14:39:02 -0400").unwrap();
    let naive = phoenix().normalize(&dt);
    assert_eq!(format_datetime(&naive), "2016-03-19 11:39:02");
  }

  #[test]
  fn rfc3339_utc_is_normalised_into_zone() {
    let dt = parse_rfc3339("2016-03-19T21:39:02Z").unwrap();
    assert_eq!(format_datetime(&phoenix().normalize(&dt)), "2016-03-19 14:39:02");
  }

  #[test]
  fn same_instant_in_different_offsets_normalises_identically() {
    let a = parse_rfc3339("2020-01-01T00:00:00+02:00").unwrap();
    let b = parse_rfc2822("Tue, 31 Dec 2019 22:00:00 GMT").unwrap();
    assert_eq!(phoenix().normalize(&a), phoenix().normalize(&b));
  }

  #[test]
  fn unix_seconds_parse() {
    let dt = parse_unix("1458423542").unwrap();
    assert_eq!(format_datetime(&CanonicalZone::default().normalize(&dt)), "2016-03-19 21:39:02");
  }

  #[test]
  fn garbage_timestamps_fail() {
    assert!(parse_rfc2822("yesterday").is_err());
    assert!(parse_rfc3339("").is_err());
    assert!(parse_unix("12ab").is_err());
  }

  #[test]
  fn stored_text_round_trips() {
    let naive = parse_datetime("2016-03-19 14:39:02").unwrap();
    assert_eq!(format_datetime(&naive), "2016-03-19 14:39:02");
    let local = phoenix().localize(&naive);
    assert_eq!(local.to_rfc3339(), "2016-03-19T14:39:02-07:00");
  }
}
