//! Handlers for `/realities` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/realities` | Body: [`CreateBody`]; generates, persists, returns the reality |
//! | `GET`  | `/realities/:user_session` | `?limit=20&offset=0`; newest first |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use whatif_core::{
  analytics::event_type,
  generator::Generation,
  reality::{NewReality, Reality},
  session::session_or_new,
  store::RealityStore,
};

use crate::{AppState, analytics, error::ApiError};

const DEFAULT_LIMIT: u32 = 20;
const MAX_LIMIT: u32 = 100;

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /realities`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  /// The "what if" phrase. Required; must not be blank.
  pub event:        Option<String>,
  /// Minted server-side when absent.
  pub user_session: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
  pub success:      bool,
  pub reality:      Reality,
  pub user_session: String,
  pub timestamp:    DateTime<Utc>,
}

/// `POST /realities`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<Json<CreateResponse>, ApiError>
where
  S: RealityStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body?;
  let event = body
    .event
    .filter(|e| !e.trim().is_empty())
    .ok_or_else(|| ApiError::Validation("event description is required".to_owned()))?;
  let session = session_or_new(body.user_session.as_deref());

  let generation = state.generator.generate(&event, &mut rand::thread_rng());
  if let Generation::Fallback { cause, .. } = &generation {
    tracing::warn!(%cause, "generator fell back to the canned reality");
  }
  let fallback = generation.is_fallback();

  let reality = state
    .store
    .insert_reality(NewReality {
      user_session:   session.clone(),
      original_event: event,
      draft:          generation.into_draft(),
    })
    .await
    .map_err(ApiError::store("failed to create reality"))?;

  analytics::record(
    &*state.store,
    &session,
    event_type::CREATE_REALITY,
    json!({
      "realityId":     reality.id,
      "originalEvent": reality.original_event,
      "outcomeCount":  reality.outcomes.len(),
      "fallback":      fallback,
    }),
  )
  .await;

  tracing::debug!(reality_id = %reality.id, session = %session, "created reality");

  Ok(Json(CreateResponse {
    success:      true,
    timestamp:    reality.created_at,
    user_session: session,
    reality,
  }))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Clamped to `1..=100`. Default 20.
  pub limit:  Option<u32>,
  pub offset: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub realities: Vec<Reality>,
  pub count:     usize,
  pub limit:     u32,
  pub offset:    u32,
}

/// `GET /realities/:user_session[?limit=...][&offset=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<String>, PathRejection>,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: RealityStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Path(user_session) = path?;
  let Query(params) = params?;
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
  let offset = params.offset.unwrap_or(0);

  let realities = state
    .store
    .list_realities(&user_session, limit, offset)
    .await
    .map_err(ApiError::store("failed to fetch realities"))?;

  Ok(Json(ListResponse {
    count: realities.len(),
    realities,
    limit,
    offset,
  }))
}
