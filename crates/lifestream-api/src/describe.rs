//! One-line human descriptions of stored items.
//!
//! Derived from the stored metadata at read time, so nothing here is
//! persisted. Missing fields degrade to a generic sentence rather than fail.

use lifestream_core::SourceKind;
use serde_json::Value;

/// The string at JSON pointer `path`, if present and non-blank.
fn text<'a>(metadata: &'a Value, path: &str) -> Option<&'a str> {
  metadata
    .pointer(path)
    .and_then(Value::as_str)
    .map(str::trim)
    .filter(|s| !s.is_empty())
}

pub fn describe(kind: SourceKind, sub_type: Option<&str>, metadata: &Value) -> String {
  match kind {
    SourceKind::Blog => match text(metadata, "/title") {
      Some(title) => format!("Posted \"{title}\""),
      None => "Wrote a blog post".to_owned(),
    },
    SourceKind::BlogComment => match text(metadata, "/title") {
      Some(title) => format!("Commented: \"{title}\""),
      None => "Left a comment".to_owned(),
    },
    SourceKind::Book => {
      match (text(metadata, "/title"), text(metadata, "/author_name")) {
        (Some(title), Some(author)) => format!("Read \"{title}\" by {author}"),
        (Some(title), None) => format!("Read \"{title}\""),
        _ => "Finished a book".to_owned(),
      }
    }
    SourceKind::Code => describe_code(sub_type, metadata),
    SourceKind::Distance => describe_distance(sub_type, metadata),
    SourceKind::Photo => match text(metadata, "/caption/text") {
      Some(caption) => format!("Posted a photo: {caption}"),
      None => "Posted a photo".to_owned(),
    },
    SourceKind::Video => match text(metadata, "/snippet/title") {
      Some(title) => format!("Uploaded \"{title}\""),
      None => "Uploaded a video".to_owned(),
    },
  }
}

fn describe_code(event_type: Option<&str>, metadata: &Value) -> String {
  let repo = text(metadata, "/repo/name").unwrap_or("a repository");
  let action = text(metadata, "/payload/action").unwrap_or("updated");
  match event_type.unwrap_or_default() {
    "PushEvent" => format!("Pushed to {repo}"),
    "CreateEvent" => {
      let what = text(metadata, "/payload/ref_type").unwrap_or("something");
      format!("Created {what} in {repo}")
    }
    "WatchEvent" => format!("Starred {repo}"),
    "ForkEvent" => format!("Forked {repo}"),
    "IssuesEvent" => format!("{} an issue in {repo}", capitalize(action)),
    "PullRequestEvent" => format!("{} a pull request in {repo}", capitalize(action)),
    "" => format!("Activity in {repo}"),
    other => format!("{other} in {repo}"),
  }
}

fn describe_distance(activity: Option<&str>, metadata: &Value) -> String {
  let activity = activity.unwrap_or("Workout");
  let value = metadata.pointer("/workout/distance/value").and_then(Value::as_f64);
  let units = text(metadata, "/workout/distance/units");
  match (value, units) {
    (Some(value), Some(units)) => format!("{activity} {value} {units}"),
    _ => activity.to_owned(),
  }
}

fn capitalize(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
