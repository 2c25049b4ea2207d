//! Handlers for the read-only event endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/events` | Optional `type`, `user`, `order`, `limit`, `offset` |
//! | `GET`  | `/events/{type}/{id}` | One stored item |
//! | `GET`  | `/types` | The `event_type` reference rows |

use axum::{
  Json,
  extract::{Path, Query, State, rejection::QueryRejection},
};
use lifestream_core::{
  Record, SourceKind,
  source::EventType,
  store::{EventQuery, EventStore, SortOrder},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppState, describe::describe, error::ApiError};

pub const DEFAULT_LIMIT: usize = 25;
pub const MAX_LIMIT: usize = 100;

// ─── View ────────────────────────────────────────────────────────────────────

/// A stored item as the API presents it.
#[derive(Debug, Serialize)]
pub struct EventView {
  pub id:          i64,
  #[serde(rename = "type")]
  pub kind:        SourceKind,
  pub description: String,
  pub metadata:    Value,
  /// RFC 3339, carrying the canonical zone's offset.
  pub date:        String,
  pub user:        String,
}

impl EventView {
  fn new<S>(record: &Record, state: &AppState<S>) -> Self {
    // Metadata that is not JSON is shown as a plain string.
    let metadata = record
      .metadata_json()
      .unwrap_or_else(|_| Value::String(record.metadata.clone()));
    Self {
      id:          record.id,
      kind:        record.source,
      description: describe(record.source, record.kind.as_deref(), &metadata),
      date:        state.zone.localize(&record.datetime).to_rfc3339(),
      user:        state.user.to_string(),
      metadata,
    }
  }
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Restrict to one source kind, by its kebab-case name.
  #[serde(rename = "type")]
  pub kind:   Option<String>,
  pub user:   Option<String>,
  pub order:  Option<SortOrder>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /events[?type=..][&user=..][&order=asc|desc][&limit=..][&offset=..]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<EventView>>, ApiError>
where
  S: EventStore,
{
  let Query(params) = params?;
  let source = params
    .kind
    .as_deref()
    .map(SourceKind::parse)
    .transpose()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  // Everything stored belongs to the configured owner.
  if params.user.as_deref().is_some_and(|u| u != &*state.user) {
    return Ok(Json(Vec::new()));
  }

  let query = EventQuery {
    source,
    order: params.order.unwrap_or_default(),
    limit: Some(params.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)),
    offset: params.offset,
  };
  let records = state
    .store
    .list_events(&query)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(records.iter().map(|r| EventView::new(r, &state)).collect()))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /events/{type}/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path((kind, id)): Path<(String, String)>,
) -> Result<Json<EventView>, ApiError>
where
  S: EventStore,
{
  let not_found = || ApiError::NotFound(format!("event {kind}/{id} not found"));
  let source = SourceKind::parse(&kind).map_err(|_| not_found())?;
  let row_id: i64 = id.parse().map_err(|_| not_found())?;

  let record = state
    .store
    .get_event(source, row_id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  Ok(Json(EventView::new(&record, &state)))
}

// ─── Types ───────────────────────────────────────────────────────────────────

/// `GET /types`
pub async fn types<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<EventType>>, ApiError>
where
  S: EventStore,
{
  let types = state.store.list_types().await.map_err(ApiError::store)?;
  Ok(Json(types))
}
