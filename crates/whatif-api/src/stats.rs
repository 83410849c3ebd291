//! Handler for `GET /stats/:user_session`.

use axum::{
  Json,
  extract::{Path, State, rejection::PathRejection},
};
use serde::Serialize;
use whatif_core::store::RealityStore;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
  pub user_session:       String,
  pub realities_created:  u64,
  pub trees_saved:        u64,
  pub total_interactions: u64,
  /// `floor(realities_created * 1.7 + total_interactions * 0.3)`
  pub diversity_score:    u64,
}

/// `GET /stats/:user_session`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  path: Result<Path<String>, PathRejection>,
) -> Result<Json<StatsResponse>, ApiError>
where
  S: RealityStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Path(user_session) = path?;
  let stats = state
    .store
    .session_stats(&user_session)
    .await
    .map_err(ApiError::store("failed to fetch stats"))?;

  Ok(Json(StatsResponse {
    realities_created:  stats.realities,
    trees_saved:        stats.trees,
    total_interactions: stats.interactions,
    diversity_score:    stats.diversity_score(),
    user_session,
  }))
}
