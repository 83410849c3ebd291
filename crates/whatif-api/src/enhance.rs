//! Handler for `POST /ai/enhance-reality`.
//!
//! A pure transformation of the posted reality: nothing is persisted apart
//! from an optional analytics event.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use whatif_core::{analytics::event_type, store::RealityStore};

use crate::{AppState, analytics, error::ApiError};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceBody {
  /// Any JSON object; `description` and `outcomes` are read if present.
  pub reality:      Option<Value>,
  pub context:      Option<String>,
  /// Only used to attribute the analytics event.
  pub user_session: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
  pub success:          bool,
  pub enhanced_reality: Value,
}

/// `POST /ai/enhance-reality`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<EnhanceBody>, JsonRejection>,
) -> Result<Json<EnhanceResponse>, ApiError>
where
  S: RealityStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body?;
  let Some(Value::Object(mut reality)) = body.reality else {
    return Err(ApiError::Validation("reality object is required".to_owned()));
  };

  let description = reality
    .get("description")
    .and_then(Value::as_str)
    .unwrap_or_default();
  let enhancement =
    state
      .generator
      .enhance(description, body.context.as_deref(), &mut rand::thread_rng());

  let mut outcomes = match reality.remove("outcomes") {
    Some(Value::Array(existing)) => existing,
    _ => Vec::new(),
  };
  let added = enhancement.outcomes.len();
  outcomes.extend(enhancement.outcomes.iter().map(|o| json!(o)));

  reality.insert("description".to_owned(), Value::String(enhancement.description));
  reality.insert("outcomes".to_owned(), Value::Array(outcomes));
  reality.insert("aiInsights".to_owned(), json!(enhancement.insights));
  reality.insert("enhancedAt".to_owned(), json!(Utc::now()));

  if let Some(session) = body.user_session.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
    analytics::record(
      &*state.store,
      session,
      event_type::ENHANCE_REALITY,
      json!({ "outcomeCount": added }),
    )
    .await;
  }

  Ok(Json(EnhanceResponse {
    success:          true,
    enhanced_reality: Value::Object(reality),
  }))
}
